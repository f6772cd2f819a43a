//! Plug-in contracts of the planner family and the concrete components
//! shipped with the crate.
//!
//! A planner is assembled from five components behind narrow interfaces:
//! a [`Sampler`], a [`DistanceEvaluator`], an [`Extender`], a
//! [`CollisionChecker`] and a [`ModelChecker`]. The RRT* planner
//! additionally requires its model checker to act as a [`CostEvaluator`];
//! [`MinimumTimeReachability`](reachability::MinimumTimeReachability)
//! plays both roles.
//!
//! Components that maintain their own indices (distance evaluators, model
//! checkers) receive a notification for every graph mutation, keyed by the
//! stable vertex and edge ids. They must drop any handle they hold during
//! its delete notification; the planner may reuse the slot afterwards.
//! Components must not mutate the graph from inside a notification.

pub mod collision;
pub mod distance;
pub mod extending;
pub mod reachability;
pub mod sampling;

pub use collision::{AnalyticCollisionChecker, FreeSpace};
pub use distance::{KdTreeDistanceEvaluator, LinearDistanceEvaluator};
pub use extending::StraightLineExtender;
pub use reachability::MinimumTimeReachability;
pub use sampling::{GoalBiasedSampler, UniformSampler};

use crate::graph::{EdgeId, Graph, Vertex, VertexId};
use crate::trajectory::Trajectory;

/// Produces the random states that drive tree growth.
pub trait Sampler<S> {
    /// Returns a state drawn from the configured support region.
    fn sample(&mut self) -> S;
}

/// Maintains a spatial index over the vertices of the graph and answers
/// nearest-neighbor and range queries against it.
pub trait DistanceEvaluator<F, S> {
    /// A vertex was inserted; the index must cover it from now on.
    fn notify_vertex_inserted(&mut self, id: VertexId, state: &S);

    /// A vertex is being deleted; the index must forget it and drop the
    /// handle.
    fn notify_vertex_removed(&mut self, id: VertexId, state: &S);

    fn notify_edge_inserted(&mut self, _id: EdgeId) {}

    fn notify_edge_removed(&mut self, _id: EdgeId) {}

    /// Returns a vertex minimising the evaluator's distance to `state`,
    /// or `None` while the index is empty.
    fn nearest(&self, state: &S) -> Option<VertexId>;

    /// Returns every vertex within `radius` of `state`.
    fn near(&self, state: &S, radius: F) -> Vec<VertexId>;
}

/// The result of a successful extension attempt.
pub struct Extension<S, U> {
    /// Feasible motion from the start state toward the target. States
    /// exclude the start and include the reached endpoint.
    pub trajectory: Trajectory<S, U>,
    /// Whether the endpoint equals the target exactly. Graph and rewiring
    /// connections require exact arrival to preserve connectivity.
    pub exact: bool,
}

/// Generates dynamically feasible trajectories between states.
pub trait Extender<S, U> {
    /// Attempts to produce a trajectory from `from` toward `to`. Returns
    /// `None` when no feasible motion exists.
    fn extend(&self, from: &S, to: &S) -> Option<Extension<S, U>>;
}

/// Decides which states and motions lie in the admissible set.
pub trait CollisionChecker<S> {
    /// Checks a single state.
    fn is_state_valid(&self, state: &S) -> bool;

    /// Checks a motion given as its start state followed by the remaining
    /// trajectory states. Implementations must inspect the endpoint as
    /// well as the intermediate motion.
    fn is_trajectory_valid(&self, start: &S, states: &[S]) -> bool;
}

/// Decides whether the graph satisfies the termination predicate and
/// materialises the satisfying trajectory.
pub trait ModelChecker<F, S, U> {
    /// A vertex was inserted. The checker may annotate it, typically by
    /// setting [`Vertex::set_reaches_goal`].
    fn notify_vertex_inserted(&mut self, id: VertexId, vertex: &mut Vertex<F, S>);

    /// A vertex is being deleted; any handle to it must be dropped.
    fn notify_vertex_removed(&mut self, _id: VertexId, _vertex: &Vertex<F, S>) {}

    fn notify_edge_inserted(&mut self, _id: EdgeId) {}

    fn notify_edge_removed(&mut self, _id: EdgeId) {}

    /// Returns the current satisfying trajectory, or `None` while the
    /// graph holds no solution.
    fn solution(&self, graph: &Graph<F, S, U>) -> Option<Trajectory<S, U>>;
}

/// Assigns costs to trajectories and observes cost changes on the graph.
pub trait CostEvaluator<F, S, U> {
    /// The total cost of `vertex` was just set or changed. Fired on
    /// insertion and again for every vertex whose cost a rewire touches.
    fn update_vertex_cost(&mut self, graph: &Graph<F, S, U>, vertex: VertexId);

    /// Retained for cost models that depend on edges beyond their
    /// endpoints; no component in this crate reacts to it.
    fn update_edge_cost(&mut self, _graph: &Graph<F, S, U>, _edge: EdgeId) {}

    /// Evaluates the cost of a trajectory between two states. Must be
    /// side-effect free; the planner consults it for every candidate edge
    /// it considers, including candidates it then discards.
    fn evaluate(&self, start: &S, trajectory: &Trajectory<S, U>, end: &S) -> F;
}
