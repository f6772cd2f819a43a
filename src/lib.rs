//! Incremental sampling-based motion planning.
//!
//! The crate builds a directed graph of reachable states one random
//! sample at a time and, for RRT*, converges on a minimum-cost trajectory
//! from an initial state into a goal region. Three iteration strategies
//! share one base planner:
//!
//! - [`planners::Rrt`] — plain rapidly-exploring random tree,
//! - [`planners::Rrg`] — RRT plus bidirectional near-set connections,
//! - [`planners::RrtStar`] — RRG plus best-parent selection, rewiring and
//!   cost propagation.
//!
//! Planners are assembled from five components behind narrow interfaces
//! (sampler, distance evaluator, extender, collision checker, model
//! checker; see [`components`]). The crate ships concrete implementations
//! for real-vector state spaces, including
//! [`components::MinimumTimeReachability`], which tracks the best
//! goal-reaching trajectory as the graph evolves.
//!
//! The planners are single-threaded and cooperative: the caller drives
//! `iteration()` in a loop and decides when to stop. Partial state is
//! always valid and can be queried between iterations.

pub mod components;
pub mod error;
pub mod graph;
pub mod obstacles;
pub mod planners;
pub mod region;
pub mod state;
pub mod trajectory;

pub use components::{
    CollisionChecker, CostEvaluator, DistanceEvaluator, Extender, Extension, MinimumTimeReachability,
    ModelChecker, Sampler,
};
pub use error::PlannerError;
pub use graph::{Edge, EdgeId, Graph, Vertex, VertexId};
pub use planners::{optimal_gamma, Parameters, Planner, Rrg, Rrt, RrtStar};
pub use region::Region;
pub use state::RealVectorState;
pub use trajectory::{Input, TimedInput, Trajectory};
