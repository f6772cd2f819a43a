use crate::components::{
    CollisionChecker, DistanceEvaluator, Extender, ModelChecker, Sampler,
};
use crate::error::PlannerError;
use crate::graph::{Graph, VertexId};
use crate::planners::base::Planner;
use crate::planners::params::Parameters;
use num_traits::Float;

/// Rapidly-exploring Random Graph.
///
/// Extends like RRT, then connects the new vertex to every vertex of its
/// near-set in both directions, provided the extension reaches its target
/// exactly and is collision free. The result is a graph: vertices may
/// have any number of incoming edges.
pub struct Rrg<F, S, U, D, M> {
    planner: Planner<F, S, U, D, M>,
    parameters: Parameters<F>,
}

impl<F, S, U, D, M> Rrg<F, S, U, D, M>
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

    pub fn parameters(&self) -> &Parameters<F> {
        &self.parameters
    }

    pub fn set_parameters(&mut self, parameters: Parameters<F>) {
        self.parameters = parameters;
    }

    pub fn initialize(&mut self, root_state: S) -> Result<VertexId, PlannerError> {
        self.planner.initialize(root_state)
    }

    /// Runs one iteration. With phase 0 this is plain RRT extension; with
    /// phase 1 and above the near-set connections run as well.
    pub fn iteration(&mut self) -> Result<Option<VertexId>, PlannerError> {
        if self.planner.root_vertex().is_none() {
            return Err(PlannerError::PreconditionViolated(
                "iteration called before initialize",
            ));
        }
        let Some((nearest, trajectory)) = self.planner.sample_and_extend() else {
            return Ok(None);
        };
        let (vertex, _) = self.planner.insert_trajectory(nearest, trajectory, None)?;

        if self.parameters.phase() >= 1 {
            self.connect_near_set(vertex, nearest)?;
        }
        Ok(Some(vertex))
    }

    /// Connects `vertex` with its near-set in both directions. Only exact
    /// extensions qualify; an approximate endpoint would not represent
    /// the vertex it claims to connect.
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
                    self.planner
                        .insert_trajectory(u, extension.trajectory, Some(vertex))?;
                }
            }

            if let Some(extension) = self.planner.extend(&new_state, &u_state) {
                if extension.exact
                    && !extension.trajectory.states.is_empty()
                    && self
                        .planner
                        .is_trajectory_valid(&new_state, &extension.trajectory.states)
                {
                    self.planner
                        .insert_trajectory(vertex, extension.trajectory, Some(u))?;
                }
            }
        }
        Ok(())
    }
}
