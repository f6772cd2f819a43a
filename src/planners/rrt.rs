use crate::components::{
    CollisionChecker, DistanceEvaluator, Extender, ModelChecker, Sampler,
};
use crate::error::PlannerError;
use crate::graph::{Graph, VertexId};
use crate::planners::base::Planner;
use num_traits::Float;

/// Rapidly-exploring Random Tree.
///
/// Each iteration samples a state, extends the nearest vertex toward it
/// and, if the motion is collision free, appends the reached state as a
/// fresh leaf. Every non-root vertex keeps exactly one incoming edge
/// because edges are only ever added toward freshly created vertices.
pub struct Rrt<F, S, U, D, M> {
    planner: Planner<F, S, U, D, M>,
}

impl<F, S, U, D, M> Rrt<F, S, U, D, M>
where
    F: Float,
    S: Clone,
    U: Clone,
    D: DistanceEvaluator<F, S>,
    M: ModelChecker<F, S, U>,
{
    /// Constructs an RRT planner from its five components.
    ///
    /// Parameters:
    /// - `sampler`: Draws the random states driving tree growth.
    /// - `distance_evaluator`: Answers nearest-neighbor queries.
    /// - `extender`: Produces feasible trajectories between states.
    /// - `collision_checker`: Validates states and motions.
    /// - `model_checker`: Decides when the graph contains a solution.
    pub fn new(
        sampler: Box<dyn Sampler<S>>,
        distance_evaluator: D,
        extender: Box<dyn Extender<S, U>>,
        collision_checker: Box<dyn CollisionChecker<S>>,
        model_checker: M,
    ) -> Self {
        Self {
            planner: Planner::new(
                sampler,
                distance_evaluator,
                extender,
                collision_checker,
                model_checker,
            ),
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

    pub fn initialize(&mut self, root_state: S) -> Result<VertexId, PlannerError> {
        self.planner.initialize(root_state)
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
        let (vertex, _) = self.planner.insert_trajectory(nearest, trajectory, None)?;
        Ok(Some(vertex))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{
        AnalyticCollisionChecker, FreeSpace, LinearDistanceEvaluator, MinimumTimeReachability,
        StraightLineExtender, UniformSampler,
    };
    use crate::obstacles::SphericalObstacle;
    use crate::region::Region;
    use crate::state::RealVectorState;
    use crate::trajectory::TimedInput;

    type State = RealVectorState<f64, 2>;
    type Mtr = MinimumTimeReachability<f64, 2, TimedInput<f64>>;

    fn state(x: f64, y: f64) -> State {
        RealVectorState::new([x, y])
    }

    fn support() -> Region<f64, 2> {
        Region::new(state(0.0, 0.0), state(10.0, 10.0))
    }

    #[test]
    fn iteration_before_initialize_fails() {
        let mut rrt = Rrt::new(
            Box::new(UniformSampler::with_seed(support(), 1).unwrap()),
            LinearDistanceEvaluator::<f64, 2>::new(),
            Box::new(StraightLineExtender::new(1.0, 0.25).unwrap()),
            Box::new(FreeSpace::new()),
            Mtr::new(Region::new(state(9.0, 9.0), state(0.5, 0.5))),
        );
        assert!(matches!(
            rrt.iteration(),
            Err(PlannerError::PreconditionViolated(_))
        ));
    }

    #[test]
    fn tree_grows_and_stays_a_tree() {
        let mut rrt = Rrt::new(
            Box::new(UniformSampler::with_seed(support(), 42).unwrap()),
            LinearDistanceEvaluator::<f64, 2>::new(),
            Box::new(StraightLineExtender::new(1.0, 0.25).unwrap()),
            Box::new(FreeSpace::new()),
            Mtr::new(Region::new(state(9.0, 9.0), state(0.5, 0.5))),
        );
        let root = rrt.initialize(state(0.0, 0.0)).unwrap();

        let mut added = 0;
        for _ in 0..200 {
            if rrt.iteration().unwrap().is_some() {
                added += 1;
            }
        }
        // Free space: every iteration extends.
        assert_eq!(added, 200);
        assert_eq!(rrt.graph().vertex_count(), 201);

        rrt.graph().check_consistency().unwrap();
        for vertex in rrt.graph().vertex_ids() {
            let incoming = rrt.graph().vertex(vertex).incoming().len();
            if vertex == root {
                assert_eq!(incoming, 0);
            } else {
                assert_eq!(incoming, 1);
            }
        }
    }

    #[test]
    fn collision_turns_iteration_into_noop() {
        // The root sits inside a shell of obstacle: every extension from
        // it crosses the sphere.
        let obstacles: Vec<Box<dyn crate::obstacles::AnalyticObstacle<f64, 2>>> = vec![Box::new(
            SphericalObstacle::new(state(0.0, 0.0), 2.0),
        )];
        let mut rrt = Rrt::new(
            Box::new(UniformSampler::with_seed(support(), 3).unwrap()),
            LinearDistanceEvaluator::<f64, 2>::new(),
            Box::new(StraightLineExtender::new(1.0, 0.25).unwrap()),
            Box::new(AnalyticCollisionChecker::new(obstacles)),
            Mtr::new(Region::new(state(9.0, 9.0), state(0.5, 0.5))),
        );
        rrt.initialize(state(0.0, 0.0)).unwrap();

        for _ in 0..50 {
            assert!(rrt.iteration().unwrap().is_none());
        }
        assert_eq!(rrt.graph().vertex_count(), 1);
    }
}
