use thiserror::Error;

/// Errors surfaced by the planner family.
///
/// Failed extensions and collisions are not errors: they turn an iteration
/// into a no-op and the iteration reports them through its return value.
/// Likewise, querying a solution before one exists yields `None`, not an
/// error.
#[derive(Error, Debug)]
pub enum PlannerError {
    /// An operation was called in a state that does not admit it, such as
    /// running an iteration before the planner was initialized or deleting
    /// the root vertex.
    #[error("precondition violated: {0}")]
    PreconditionViolated(&'static str),

    /// A configuration value is outside its admissible range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// An internal invariant no longer holds. This is a defect in the
    /// planner or in a plug-in component, not a recoverable condition.
    #[error("graph inconsistency: {0}")]
    Inconsistent(String),
}
