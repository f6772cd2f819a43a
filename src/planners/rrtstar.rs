use crate::components::{
    CollisionChecker, CostEvaluator, DistanceEvaluator, Extender, ModelChecker, Sampler,
};
use crate::error::PlannerError;
use crate::graph::{EdgeId, Graph, VertexId};
use crate::planners::base::Planner;
use crate::planners::params::Parameters;
use crate::trajectory::Trajectory;
use num_traits::Float;
use tracing::trace;

/// Asymptotically optimal Rapidly-exploring Random Tree.
///
/// Extends like RRT, but picks the lowest-cost parent among the near-set
/// of the reached state and then rewires the near-set through the new
/// vertex wherever that lowers a total cost. The graph stays a tree: a
/// rewire deletes the one incoming edge of the rewired vertex before
/// adding its replacement, and the cost change is propagated depth-first
/// through the rewired vertex's descendants.
///
/// The model checker must double as the cost evaluator so it observes
/// every cost update, including the transitive ones; the cost evaluator
/// is consulted for every candidate edge the planner considers.
pub struct RrtStar<F, S, U, D, M> {
    planner: Planner<F, S, U, D, M>,
    parameters: Parameters<F>,
}

impl<F, S, U, D, M> RrtStar<F, S, U, D, M>
where
    F: Float,
    S: Clone,
    U: Clone,
    D: DistanceEvaluator<F, S>,
    M: ModelChecker<F, S, U> + CostEvaluator<F, S, U>,
{
    /// Constructs an RRT* planner from its components and parameters.
    ///
    /// Parameters:
    /// - `sampler`: Draws the random states driving tree growth.
    /// - `distance_evaluator`: Answers nearest and near-set queries.
    /// - `extender`: Produces feasible trajectories between states.
    /// - `collision_checker`: Validates states and motions.
    /// - `model_checker`: Combined model checker and cost evaluator.
    /// - `parameters`: Phase selection and near-radius schedule.
    pub fn new(
        sampler: Box<dyn Sampler<S>>,
        distance_evaluator: D,
        extender: Box<dyn Extender<S, U>>,
        collision_checker: Box<dyn CollisionChecker<S>>,
        model_checker: M,
        parameters: Parameters<F>,
    ) -> Self {
        Self {
            planner: Planner::new(
                sampler,
                distance_evaluator,
                extender,
                collision_checker,
                model_checker,
            ),
            parameters,
        }
    }

    pub fn planner(&self) -> &Planner<F, S, U, D, M> {
        &self.planner
    }

    pub fn planner_mut(&mut self) -> &mut Planner<F, S, U, D, M> {
        &mut self.planner
    }

    pub fn graph(&self) -> &Graph<F, S, U> {
        self.planner.graph()
    }

    pub fn root_vertex(&self) -> Option<VertexId> {
        self.planner.root_vertex()
    }

    pub fn model_checker(&self) -> &M {
        self.planner.model_checker()
    }

    pub fn model_checker_mut(&mut self) -> &mut M {
        self.planner.model_checker_mut()
    }

    pub fn parameters(&self) -> &Parameters<F> {
        &self.parameters
    }

    pub fn set_parameters(&mut self, parameters: Parameters<F>) {
        self.parameters = parameters;
    }

    pub fn initialize(&mut self, root_state: S) -> Result<VertexId, PlannerError> {
        self.planner.initialize_costed(root_state)
    }

    /// Runs one iteration. Returns the newly added vertex, or `None` when
    /// the extension failed or collided and the graph was left untouched.
    pub fn iteration(&mut self) -> Result<Option<VertexId>, PlannerError> {
        if self.planner.root_vertex().is_none() {
            return Err(PlannerError::PreconditionViolated(
                "iteration called before initialize",
            ));
        }
        let Some((nearest, trajectory)) = self.planner.sample_and_extend() else {
            return Ok(None);
        };
        let Some(endpoint) = trajectory.states.last().cloned() else {
            return Ok(None);
        };

        let nearest_state = self.planner.graph().vertex(nearest).state().clone();
        let initial_cost = self
            .planner
            .evaluate_cost(&nearest_state, &trajectory, &endpoint);

        if self.parameters.phase() < 2 {
            let total = self.planner.graph().vertex(nearest).total_cost() + initial_cost;
            let (vertex, _) = self.planner.insert_costed_vertex_trajectory(
                nearest,
                trajectory,
                initial_cost,
                total,
            )?;
            if self.parameters.phase() == 1 {
                self.connect_near_set(vertex, nearest)?;
            }
            return Ok(Some(vertex));
        }

        // The near-set of the candidate endpoint, computed before the new
        // vertex exists.
        let radius = self.parameters.near_radius(self.planner.graph().vertex_count());
        let near = self.planner.near(&endpoint, radius);

        let (parent, parent_trajectory, edge_cost, total_cost) =
            self.choose_best_parent(nearest, trajectory, initial_cost, &endpoint, &near);
        let (vertex, _) = self.planner.insert_costed_vertex_trajectory(
            parent,
            parent_trajectory,
            edge_cost,
            total_cost,
        )?;

        self.rewire(vertex, parent, &endpoint, &near)?;
        Ok(Some(vertex))
    }

    /// Selects the near-set member that reaches the endpoint exactly and
    /// collision free at the lowest accumulated cost. The vertex found by
    /// the nearest query, whose trajectory already passed the collision
    /// check, is the fallback candidate. Ties go to the parent with the
    /// lower accumulated cost, then to the earlier candidate.
    fn choose_best_parent(
        &mut self,
        nearest: VertexId,
        nearest_trajectory: Trajectory<S, U>,
        nearest_edge_cost: F,
        endpoint: &S,
        near: &[VertexId],
    ) -> (VertexId, Trajectory<S, U>, F, F) {
        let graph = self.planner.graph();
        let mut best_parent = nearest;
        let mut best_trajectory = nearest_trajectory;
        let mut best_edge_cost = nearest_edge_cost;
        let mut best_total = graph.vertex(nearest).total_cost() + nearest_edge_cost;

        for &u in near {
            if u == nearest {
                continue;
            }
            let u_state = self.planner.graph().vertex(u).state().clone();
            let Some(extension) = self.planner.extend(&u_state, endpoint) else {
                continue;
            };
            if !extension.exact || extension.trajectory.states.is_empty() {
                continue;
            }
            if !self
                .planner
                .is_trajectory_valid(&u_state, &extension.trajectory.states)
            {
                continue;
            }
            let edge_cost = self
                .planner
                .evaluate_cost(&u_state, &extension.trajectory, endpoint);
            let u_total = self.planner.graph().vertex(u).total_cost();
            let total = u_total + edge_cost;

            let current_parent_total = self.planner.graph().vertex(best_parent).total_cost();
            if total < best_total || (total == best_total && u_total < current_parent_total) {
                best_parent = u;
                best_trajectory = extension.trajectory;
                best_edge_cost = edge_cost;
                best_total = total;
            }
        }

        (best_parent, best_trajectory, best_edge_cost, best_total)
    }

    /// Reroutes near-set members through the new vertex wherever that is
    /// cheaper, replacing their single incoming edge and pushing the cost
    /// change down to their descendants.
    fn rewire(
        &mut self,
        vertex: VertexId,
        parent: VertexId,
        new_state: &S,
        near: &[VertexId],
    ) -> Result<(), PlannerError> {
        let root = self.planner.root_vertex();
        let vertex_total = self.planner.graph().vertex(vertex).total_cost();

        for &u in near {
            if u == parent || u == vertex || Some(u) == root {
                continue;
            }
            let u_state = self.planner.graph().vertex(u).state().clone();
            let Some(extension) = self.planner.extend(new_state, &u_state) else {
                continue;
            };
            if !extension.exact || extension.trajectory.states.is_empty() {
                continue;
            }
            if !self
                .planner
                .is_trajectory_valid(new_state, &extension.trajectory.states)
            {
                continue;
            }
            let edge_cost = self
                .planner
                .evaluate_cost(new_state, &extension.trajectory, &u_state);
            let candidate_total = vertex_total + edge_cost;
            if candidate_total >= self.planner.graph().vertex(u).total_cost() {
                continue;
            }

            let incoming = self.planner.graph().vertex(u).incoming();
            debug_assert_eq!(incoming.len(), 1, "rewired vertex must have one parent");
            let Some(&old_edge) = incoming.last() else {
                continue;
            };
            trace!(
                rewired = u.index(),
                through = vertex.index(),
                "rewiring vertex"
            );
            self.planner.delete_edge(old_edge);
            self.planner
                .insert_costed_edge(vertex, extension.trajectory, u, edge_cost)?;
            self.planner.update_vertex_cost(u, candidate_total);
            self.propagate_descendant_costs(u);
        }
        Ok(())
    }

    /// Depth-first cost propagation: every descendant of `start` takes
    /// its parent's new total plus its own edge cost, and each change is
    /// reported to the cost evaluator.
    fn propagate_descendant_costs(&mut self, start: VertexId) {
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            let base = self.planner.graph().vertex(current).total_cost();
            let outgoing: Vec<EdgeId> = self.planner.graph().vertex(current).outgoing().to_vec();
            for edge_id in outgoing {
                let (child, edge_cost) = {
                    let edge = self.planner.graph().edge(edge_id);
                    (edge.dst(), edge.cost())
                };
                self.planner.update_vertex_cost(child, base + edge_cost);
                stack.push(child);
            }
        }
    }

    /// RRG-style bidirectional near-set connections, used in phase 1.
    /// Edge costs are evaluated and recorded but no vertex cost changes;
    /// with multiple parents per vertex the accumulated cost of the first
    /// parent chain is the one kept.
    fn connect_near_set(
        &mut self,
        vertex: VertexId,
        nearest: VertexId,
    ) -> Result<(), PlannerError> {
        let radius = self.parameters.near_radius(self.planner.graph().vertex_count());
        let new_state = self.planner.graph().vertex(vertex).state().clone();
        let near = self.planner.near(&new_state, radius);

        for u in near {
            if u == vertex || u == nearest {
                continue;
            }
            let u_state = self.planner.graph().vertex(u).state().clone();

            if let Some(extension) = self.planner.extend(&u_state, &new_state) {
                if extension.exact
                    && !extension.trajectory.states.is_empty()
                    && self
                        .planner
                        .is_trajectory_valid(&u_state, &extension.trajectory.states)
                {
                    let edge_cost =
                        self.planner
                            .evaluate_cost(&u_state, &extension.trajectory, &new_state);
                    self.planner
                        .insert_costed_edge(u, extension.trajectory, vertex, edge_cost)?;
                }
            }

            if let Some(extension) = self.planner.extend(&new_state, &u_state) {
                if extension.exact
                    && !extension.trajectory.states.is_empty()
                    && self
                        .planner
                        .is_trajectory_valid(&new_state, &extension.trajectory.states)
                {
                    let edge_cost =
                        self.planner
                            .evaluate_cost(&new_state, &extension.trajectory, &u_state);
                    self.planner
                        .insert_costed_edge(vertex, extension.trajectory, u, edge_cost)?;
                }
            }
        }
        Ok(())
    }
}

/// The near-radius coefficient that makes the RRT* near-set schedule
/// asymptotically optimal for a problem with the given free-space volume
/// and dimension.
pub fn optimal_gamma(free_space_volume: f64, dimension: usize) -> Result<f64, PlannerError> {
    if free_space_volume <= 0.0 {
        return Err(PlannerError::InvalidParameter(
            "free space volume must be positive".to_string(),
        ));
    }
    if dimension == 0 {
        return Err(PlannerError::InvalidParameter(
            "dimension must be at least 1".to_string(),
        ));
    }

    let d = dimension as f64;
    let unit_ball_volume = std::f64::consts::PI.powf(d / 2.0) / special::Gamma::gamma(1.0 + d / 2.0);
    Ok((2.0 * (1.0 + 1.0 / d) * free_space_volume / unit_ball_volume).powf(1.0 / d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn optimal_gamma_2d() {
        // Unit ball volume in 2D is pi, so gamma^2 = 3 * area / pi.
        let gamma = optimal_gamma(100.0, 2).unwrap();
        assert_relative_eq!(gamma, (300.0 / std::f64::consts::PI).sqrt(), max_relative = 1e-9);
    }

    #[test]
    fn optimal_gamma_rejects_bad_inputs() {
        assert!(optimal_gamma(0.0, 2).is_err());
        assert!(optimal_gamma(10.0, 0).is_err());
    }
}
