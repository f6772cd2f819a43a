use crate::components::{
    CollisionChecker, CostEvaluator, DistanceEvaluator, Extender, Extension, ModelChecker, Sampler,
};
use crate::error::PlannerError;
use crate::graph::{Edge, EdgeId, Graph, Vertex, VertexId};
use crate::trajectory::Trajectory;
use num_traits::Float;
use tracing::debug;

/// User callback observing vertex insertions or deletions.
pub type VertexCallback<F, S> = Box<dyn FnMut(VertexId, &Vertex<F, S>)>;

/// User callback observing edge insertions or deletions.
pub type EdgeCallback<F, S, U> = Box<dyn FnMut(EdgeId, &Edge<F, S, U>)>;

/// The base incremental planner: owns the graph and the five plug-in
/// components, and fans every graph mutation out to them.
///
/// For each mutation the distance evaluator is notified first, the model
/// checker second, and the user callbacks last, in registration order.
/// Components must not mutate the graph from inside a notification.
///
/// The concrete iteration strategies ([`Rrt`](crate::planners::Rrt),
/// [`Rrg`](crate::planners::Rrg), [`RrtStar`](crate::planners::RrtStar))
/// each wrap a `Planner` and drive it through the operations below.
pub struct Planner<F, S, U, D, M> {
    graph: Graph<F, S, U>,
    sampler: Box<dyn Sampler<S>>,
    distance_evaluator: D,
    extender: Box<dyn Extender<S, U>>,
    collision_checker: Box<dyn CollisionChecker<S>>,
    model_checker: M,
    vertex_insert_callbacks: Vec<VertexCallback<F, S>>,
    vertex_delete_callbacks: Vec<VertexCallback<F, S>>,
    edge_insert_callbacks: Vec<EdgeCallback<F, S, U>>,
    edge_delete_callbacks: Vec<EdgeCallback<F, S, U>>,
}

impl<F, S, U, D, M> Planner<F, S, U, D, M>
where
    F: Float,
    S: Clone,
    U: Clone,
    D: DistanceEvaluator<F, S>,
    M: ModelChecker<F, S, U>,
{
    pub fn new(
        sampler: Box<dyn Sampler<S>>,
        distance_evaluator: D,
        extender: Box<dyn Extender<S, U>>,
        collision_checker: Box<dyn CollisionChecker<S>>,
        model_checker: M,
    ) -> Self {
        Self {
            graph: Graph::new(),
            sampler,
            distance_evaluator,
            extender,
            collision_checker,
            model_checker,
            vertex_insert_callbacks: Vec::new(),
            vertex_delete_callbacks: Vec::new(),
            edge_insert_callbacks: Vec::new(),
            edge_delete_callbacks: Vec::new(),
        }
    }

    pub fn graph(&self) -> &Graph<F, S, U> {
        &self.graph
    }

    pub fn root_vertex(&self) -> Option<VertexId> {
        self.graph.root()
    }

    pub fn model_checker(&self) -> &M {
        &self.model_checker
    }

    pub fn model_checker_mut(&mut self) -> &mut M {
        &mut self.model_checker
    }

    pub fn distance_evaluator(&self) -> &D {
        &self.distance_evaluator
    }

    // Component replacement for staged wiring. Swapping a component after
    // `initialize` leaves its index out of sync; re-initialize afterwards.

    pub fn set_sampler(&mut self, sampler: Box<dyn Sampler<S>>) {
        self.sampler = sampler;
    }

    pub fn set_distance_evaluator(&mut self, distance_evaluator: D) {
        self.distance_evaluator = distance_evaluator;
    }

    pub fn set_extender(&mut self, extender: Box<dyn Extender<S, U>>) {
        self.extender = extender;
    }

    pub fn set_collision_checker(&mut self, collision_checker: Box<dyn CollisionChecker<S>>) {
        self.collision_checker = collision_checker;
    }

    pub fn set_model_checker(&mut self, model_checker: M) {
        self.model_checker = model_checker;
    }

    /// Discards any existing graph and seeds a fresh one with a single
    /// root vertex carrying `root_state` at zero cost.
    ///
    /// Every discarded vertex and edge goes through the usual delete
    /// fan-out so plug-in indices end up empty, then the root insertion
    /// fires the insert fan-out. Calling this twice in a row is
    /// equivalent to calling it once.
    pub fn initialize(&mut self, root_state: S) -> Result<VertexId, PlannerError> {
        self.teardown()?;
        let root = self.graph.add_vertex(root_state);
        self.graph.set_root(Some(root));
        self.fire_vertex_inserted(root);
        debug!(root = root.index(), "planner initialized");
        Ok(root)
    }

    /// Appends a vertex and fires the insert fan-out.
    pub fn insert_vertex(&mut self, state: S) -> VertexId {
        let id = self.graph.add_vertex(state);
        self.fire_vertex_inserted(id);
        id
    }

    /// Deletes a vertex: fires the vertex delete fan-out, then deletes
    /// every incident edge (each with its own fan-out), then frees the
    /// slot. The root cannot be deleted.
    pub fn delete_vertex(&mut self, id: VertexId) -> Result<(), PlannerError> {
        if self.graph.root() == Some(id) {
            return Err(PlannerError::PreconditionViolated(
                "the root vertex cannot be deleted",
            ));
        }
        self.delete_vertex_unchecked(id)
    }

    fn delete_vertex_unchecked(&mut self, id: VertexId) -> Result<(), PlannerError> {
        self.fire_vertex_removed(id);

        let mut incident: Vec<EdgeId> = self.graph.vertex(id).incoming().to_vec();
        incident.extend_from_slice(self.graph.vertex(id).outgoing());
        for edge in incident {
            // A self-loop shows up in both lists; delete it once.
            if self.graph.get_edge(edge).is_some() {
                self.delete_edge(edge);
            }
        }

        self.graph.remove_vertex(id)?;
        Ok(())
    }

    /// Connects two existing vertices and fires the edge insert fan-out.
    /// The trajectory must already exclude the destination state.
    pub fn insert_edge(
        &mut self,
        src: VertexId,
        dst: VertexId,
        trajectory: Trajectory<S, U>,
        cost: F,
    ) -> EdgeId {
        let id = self.graph.add_edge(src, dst, trajectory, cost);
        self.fire_edge_inserted(id);
        id
    }

    /// Deletes an edge: fires the delete fan-out, then unlinks and frees
    /// it together with the trajectory it owns.
    pub fn delete_edge(&mut self, id: EdgeId) {
        self.fire_edge_removed(id);
        self.graph.remove_edge(id);
    }

    /// Inserts an extender trajectory starting at `src`.
    ///
    /// The trajectory's final state leaves the trajectory: it either
    /// becomes a fresh destination vertex (when `dst` is `None`) or is
    /// dropped as a duplicate of the given destination's state. Vertex
    /// and edge insertions fire their fan-outs in that order.
    pub fn insert_trajectory(
        &mut self,
        src: VertexId,
        mut trajectory: Trajectory<S, U>,
        dst: Option<VertexId>,
    ) -> Result<(VertexId, EdgeId), PlannerError> {
        let endpoint = Self::take_endpoint(&mut trajectory)?;
        let dst = match dst {
            Some(vertex) => vertex,
            None => self.insert_vertex(endpoint),
        };
        let edge = self.insert_edge(src, dst, trajectory, F::zero());
        Ok((dst, edge))
    }

    fn take_endpoint(trajectory: &mut Trajectory<S, U>) -> Result<S, PlannerError> {
        if trajectory.states.len() != trajectory.inputs.len() {
            return Err(PlannerError::PreconditionViolated(
                "trajectory states and inputs must be co-indexed",
            ));
        }
        trajectory.states.pop().ok_or(PlannerError::PreconditionViolated(
            "cannot insert an empty trajectory",
        ))
    }

    // Callback registration. Callbacks run after the component
    // notifications for the same mutation, in registration order.

    pub fn register_vertex_insert_callback(&mut self, callback: VertexCallback<F, S>) {
        self.vertex_insert_callbacks.push(callback);
    }

    pub fn clear_vertex_insert_callbacks(&mut self) {
        self.vertex_insert_callbacks.clear();
    }

    pub fn register_vertex_delete_callback(&mut self, callback: VertexCallback<F, S>) {
        self.vertex_delete_callbacks.push(callback);
    }

    pub fn clear_vertex_delete_callbacks(&mut self) {
        self.vertex_delete_callbacks.clear();
    }

    pub fn register_edge_insert_callback(&mut self, callback: EdgeCallback<F, S, U>) {
        self.edge_insert_callbacks.push(callback);
    }

    pub fn clear_edge_insert_callbacks(&mut self) {
        self.edge_insert_callbacks.clear();
    }

    pub fn register_edge_delete_callback(&mut self, callback: EdgeCallback<F, S, U>) {
        self.edge_delete_callbacks.push(callback);
    }

    pub fn clear_edge_delete_callbacks(&mut self) {
        self.edge_delete_callbacks.clear();
    }

    // Query helpers for the iteration strategies.

    pub fn near(&self, state: &S, radius: F) -> Vec<VertexId> {
        self.distance_evaluator.near(state, radius)
    }

    pub fn extend(&self, from: &S, to: &S) -> Option<Extension<S, U>> {
        self.extender.extend(from, to)
    }

    pub fn is_trajectory_valid(&self, start: &S, states: &[S]) -> bool {
        self.collision_checker.is_trajectory_valid(start, states)
    }

    /// Runs the shared front half of an iteration: draw a sample, find
    /// the nearest vertex, extend toward the sample and collision-check
    /// the result with the source state prepended. Returns `None` when
    /// the extension fails or collides, which makes the iteration a no-op.
    pub(crate) fn sample_and_extend(&mut self) -> Option<(VertexId, Trajectory<S, U>)> {
        let sample = self.sampler.sample();
        let nearest = self.distance_evaluator.nearest(&sample)?;
        let from = self.graph.vertex(nearest).state().clone();
        let extension = self.extender.extend(&from, &sample)?;
        if extension.trajectory.states.is_empty() {
            return None;
        }
        if !self
            .collision_checker
            .is_trajectory_valid(&from, &extension.trajectory.states)
        {
            return None;
        }
        Some((nearest, extension.trajectory))
    }

    fn teardown(&mut self) -> Result<(), PlannerError> {
        let ids: Vec<VertexId> = self.graph.vertex_ids().collect();
        for id in ids {
            if self.graph.get_vertex(id).is_some() {
                self.delete_vertex_unchecked(id)?;
            }
        }
        self.graph.clear();
        Ok(())
    }

    // Fan-out. Order per mutation: distance evaluator, model checker,
    // user callbacks.

    fn fire_vertex_inserted(&mut self, id: VertexId) {
        self.distance_evaluator
            .notify_vertex_inserted(id, self.graph.vertex(id).state());
        self.model_checker
            .notify_vertex_inserted(id, self.graph.vertex_mut(id));
        for callback in self.vertex_insert_callbacks.iter_mut() {
            callback(id, self.graph.vertex(id));
        }
    }

    fn fire_vertex_removed(&mut self, id: VertexId) {
        self.distance_evaluator
            .notify_vertex_removed(id, self.graph.vertex(id).state());
        self.model_checker
            .notify_vertex_removed(id, self.graph.vertex(id));
        for callback in self.vertex_delete_callbacks.iter_mut() {
            callback(id, self.graph.vertex(id));
        }
    }

    fn fire_edge_inserted(&mut self, id: EdgeId) {
        self.distance_evaluator.notify_edge_inserted(id);
        self.model_checker.notify_edge_inserted(id);
        for callback in self.edge_insert_callbacks.iter_mut() {
            callback(id, self.graph.edge(id));
        }
    }

    fn fire_edge_removed(&mut self, id: EdgeId) {
        self.distance_evaluator.notify_edge_removed(id);
        self.model_checker.notify_edge_removed(id);
        for callback in self.edge_delete_callbacks.iter_mut() {
            callback(id, self.graph.edge(id));
        }
    }
}

// Cost-aware operations, available when the model checker doubles as the
// cost evaluator (the RRT* composition).
impl<F, S, U, D, M> Planner<F, S, U, D, M>
where
    F: Float,
    S: Clone,
    U: Clone,
    D: DistanceEvaluator<F, S>,
    M: ModelChecker<F, S, U> + CostEvaluator<F, S, U>,
{
    /// [`Planner::initialize`], followed by a cost update for the root so
    /// a root that already satisfies the model checker is reported as a
    /// zero-cost solution.
    pub fn initialize_costed(&mut self, root_state: S) -> Result<VertexId, PlannerError> {
        let root = self.initialize(root_state)?;
        self.model_checker.update_vertex_cost(&self.graph, root);
        Ok(root)
    }

    /// Inserts a trajectory ending in a fresh vertex with the given edge
    /// and accumulated costs, then fires the cost update for the vertex.
    pub fn insert_costed_vertex_trajectory(
        &mut self,
        src: VertexId,
        mut trajectory: Trajectory<S, U>,
        edge_cost: F,
        total_cost: F,
    ) -> Result<(VertexId, EdgeId), PlannerError> {
        let endpoint = Self::take_endpoint(&mut trajectory)?;
        let vertex = self.graph.add_vertex(endpoint);
        self.graph.vertex_mut(vertex).set_total_cost(total_cost);
        self.fire_vertex_inserted(vertex);
        let edge = self.graph.add_edge(src, vertex, trajectory, edge_cost);
        self.fire_edge_inserted_costed(edge);
        self.model_checker.update_vertex_cost(&self.graph, vertex);
        Ok((vertex, edge))
    }

    /// Inserts a trajectory as an edge between two existing vertices with
    /// the given cost. The destination's total cost is left untouched;
    /// use [`Planner::update_vertex_cost`] when the new edge becomes its
    /// parent.
    pub fn insert_costed_edge(
        &mut self,
        src: VertexId,
        mut trajectory: Trajectory<S, U>,
        dst: VertexId,
        edge_cost: F,
    ) -> Result<EdgeId, PlannerError> {
        Self::take_endpoint(&mut trajectory)?;
        let edge = self.graph.add_edge(src, dst, trajectory, edge_cost);
        self.fire_edge_inserted_costed(edge);
        Ok(edge)
    }

    /// Sets a vertex's accumulated cost and fires the cost update.
    pub fn update_vertex_cost(&mut self, id: VertexId, total_cost: F) {
        self.graph.vertex_mut(id).set_total_cost(total_cost);
        self.model_checker.update_vertex_cost(&self.graph, id);
    }

    /// Evaluates the cost of a candidate trajectory between two states.
    pub fn evaluate_cost(&self, start: &S, trajectory: &Trajectory<S, U>, end: &S) -> F {
        self.model_checker.evaluate(start, trajectory, end)
    }

    fn fire_edge_inserted_costed(&mut self, id: EdgeId) {
        self.distance_evaluator.notify_edge_inserted(id);
        ModelChecker::notify_edge_inserted(&mut self.model_checker, id);
        self.model_checker.update_edge_cost(&self.graph, id);
        for callback in self.edge_insert_callbacks.iter_mut() {
            callback(id, self.graph.edge(id));
        }
    }
}
