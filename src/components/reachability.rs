use crate::components::{CostEvaluator, ModelChecker};
use crate::graph::{Graph, Vertex, VertexId};
use crate::region::Region;
use crate::state::RealVectorState;
use crate::trajectory::{Input, Trajectory};
use num_traits::Float;
use tracing::info;

type State<F, const N: usize> = RealVectorState<F, N>;

/// Callback invoked with the new best trajectory whenever the tracked
/// solution improves. The argument is a fresh deep copy; it stays valid
/// across later rewires.
pub type SolutionCallback<F, const N: usize, U> = Box<dyn FnMut(&Trajectory<State<F, N>, U>)>;

type DistanceFn<F, const N: usize> = Box<dyn Fn(&State<F, N>, &State<F, N>) -> [F; N]>;
type CostFn<F, const N: usize, U> =
    Box<dyn Fn(&State<F, N>, &Trajectory<State<F, N>, U>, &State<F, N>) -> F>;

/// Model checker and cost evaluator for minimum-time reachability of a
/// goal region.
///
/// As a model checker it annotates every inserted vertex with goal
/// membership; as a cost evaluator it observes every total-cost change and
/// tracks the cheapest goal-reaching vertex. Playing both roles lets it
/// see the transitive cost updates a rewire produces, which is what keeps
/// the tracked solution current as the tree improves.
///
/// The tracked vertex is replaced on equal cost (`<=`, not `<`) on
/// purpose: when a rewire produces an equivalent-cost route through fresh
/// structure, the newer vertex supersedes the stale reference.
pub struct MinimumTimeReachability<F, const N: usize, U> {
    goal: Region<F, N>,
    min_cost_vertex: Option<VertexId>,
    min_cost: Option<F>,
    distance_function: Option<DistanceFn<F, N>>,
    cost_function: Option<CostFn<F, N, U>>,
    solution_callbacks: Vec<SolutionCallback<F, N, U>>,
}

impl<F: Float, const N: usize, U: Clone> MinimumTimeReachability<F, N, U> {
    pub fn new(goal: Region<F, N>) -> Self {
        Self {
            goal,
            min_cost_vertex: None,
            min_cost: None,
            distance_function: None,
            cost_function: None,
            solution_callbacks: Vec::new(),
        }
    }

    /// Replaces the goal region. Vertices already in the graph keep the
    /// annotation they were inserted with.
    pub fn set_goal_region(&mut self, goal: Region<F, N>) {
        self.goal = goal;
    }

    pub fn goal_region(&self) -> &Region<F, N> {
        &self.goal
    }

    /// Overrides the component-wise distance used for the goal test. The
    /// default is plain subtraction; a custom function can wrap angular
    /// dimensions or weight axes.
    pub fn set_distance_function(&mut self, f: DistanceFn<F, N>) {
        self.distance_function = Some(f);
    }

    /// Overrides the trajectory cost. The default sums the input
    /// durations, i.e. total time.
    pub fn set_cost_function(&mut self, f: CostFn<F, N, U>) {
        self.cost_function = Some(f);
    }

    /// Registers a callback fired on every solution improvement.
    pub fn register_solution_callback(&mut self, callback: SolutionCallback<F, N, U>) {
        self.solution_callbacks.push(callback);
    }

    pub fn clear_solution_callbacks(&mut self) {
        self.solution_callbacks.clear();
    }

    /// Cost of the best goal-reaching vertex seen so far.
    pub fn best_cost(&self) -> Option<F> {
        self.min_cost
    }

    /// The currently tracked goal-reaching vertex.
    pub fn min_cost_vertex(&self) -> Option<VertexId> {
        self.min_cost_vertex
    }

    fn reaches_goal(&self, state: &State<F, N>) -> bool {
        let distance = match &self.distance_function {
            Some(f) => f(state, self.goal.center()),
            None => {
                let mut d = [F::zero(); N];
                for i in 0..N {
                    d[i] = (*state)[i] - (*self.goal.center())[i];
                }
                d
            }
        };
        (0..N).all(|i| distance[i].abs() <= (*self.goal.size())[i])
    }

    /// Rebuilds the best trajectory by walking incoming edges from the
    /// goal vertex back to the root, then reversing. The result runs
    /// forward from the root state to the goal vertex state inclusive.
    fn reconstruct(
        &self,
        graph: &Graph<F, State<F, N>, U>,
        goal_vertex: VertexId,
    ) -> Trajectory<State<F, N>, U> {
        let mut states = Vec::new();
        let mut inputs = Vec::new();
        let mut current = goal_vertex;
        loop {
            states.push(*graph.vertex(current).state());
            let Some(&edge_id) = graph.vertex(current).incoming().last() else {
                break;
            };
            let edge = graph.edge(edge_id);
            states.extend(edge.trajectory().states.iter().rev().cloned());
            inputs.extend(edge.trajectory().inputs.iter().rev().cloned());
            current = edge.src();
        }
        states.reverse();
        inputs.reverse();
        Trajectory::new(states, inputs)
    }
}

impl<F: Float, const N: usize, U: Clone> ModelChecker<F, State<F, N>, U>
    for MinimumTimeReachability<F, N, U>
{
    fn notify_vertex_inserted(&mut self, _id: VertexId, vertex: &mut Vertex<F, State<F, N>>) {
        let reaches = self.reaches_goal(vertex.state());
        vertex.set_reaches_goal(reaches);
    }

    fn notify_vertex_removed(&mut self, id: VertexId, _vertex: &Vertex<F, State<F, N>>) {
        if self.min_cost_vertex == Some(id) {
            self.min_cost_vertex = None;
            self.min_cost = None;
        }
    }

    fn solution(&self, graph: &Graph<F, State<F, N>, U>) -> Option<Trajectory<State<F, N>, U>> {
        self.min_cost_vertex
            .map(|vertex| self.reconstruct(graph, vertex))
    }
}

impl<F: Float, const N: usize, U: Clone + Input<F>> CostEvaluator<F, State<F, N>, U>
    for MinimumTimeReachability<F, N, U>
{
    fn update_vertex_cost(&mut self, graph: &Graph<F, State<F, N>, U>, vertex: VertexId) {
        if !graph.vertex(vertex).reaches_goal() {
            return;
        }
        let cost = graph.vertex(vertex).total_cost();
        let improved = match self.min_cost {
            None => true,
            Some(best) => cost <= best,
        };
        if !improved {
            return;
        }

        self.min_cost_vertex = Some(vertex);
        self.min_cost = Some(cost);
        info!(cost = cost.to_f64().unwrap_or(f64::NAN), "solution improved");

        if !self.solution_callbacks.is_empty() {
            let trajectory = self.reconstruct(graph, vertex);
            for callback in self.solution_callbacks.iter_mut() {
                callback(&trajectory);
            }
        }
    }

    fn evaluate(
        &self,
        start: &State<F, N>,
        trajectory: &Trajectory<State<F, N>, U>,
        end: &State<F, N>,
    ) -> F {
        match &self.cost_function {
            Some(f) => f(start, trajectory, end),
            None => trajectory.duration(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::TimedInput;
    use approx::assert_relative_eq;

    type Mtr = MinimumTimeReachability<f64, 2, TimedInput<f64>>;
    type TestGraph = Graph<f64, RealVectorState<f64, 2>, TimedInput<f64>>;

    fn state(x: f64, y: f64) -> RealVectorState<f64, 2> {
        RealVectorState::new([x, y])
    }

    fn goal_at(x: f64, y: f64) -> Region<f64, 2> {
        Region::new(state(x, y), state(0.5, 0.5))
    }

    #[test]
    fn goal_membership_annotation() {
        let mut mtr = Mtr::new(goal_at(9.0, 9.0));
        let mut graph = TestGraph::new();
        let inside = graph.add_vertex(state(9.2, 8.8));
        let outside = graph.add_vertex(state(5.0, 5.0));

        ModelChecker::notify_vertex_inserted(&mut mtr, inside, graph.vertex_mut(inside));
        assert!(graph.vertex(inside).reaches_goal());

        ModelChecker::notify_vertex_inserted(&mut mtr, outside, graph.vertex_mut(outside));
        assert!(!graph.vertex(outside).reaches_goal());
    }

    #[test]
    fn root_in_goal_yields_single_state_solution() {
        let mut mtr = Mtr::new(goal_at(0.0, 0.0));
        let mut graph = TestGraph::new();
        let root = graph.add_vertex(state(0.1, -0.1));
        graph.set_root(Some(root));

        ModelChecker::notify_vertex_inserted(&mut mtr, root, graph.vertex_mut(root));
        CostEvaluator::update_vertex_cost(&mut mtr, &graph, root);

        assert_relative_eq!(mtr.best_cost().unwrap(), 0.0);
        let solution = mtr.solution(&graph).unwrap();
        assert_eq!(solution.states, vec![state(0.1, -0.1)]);
        assert!(solution.inputs.is_empty());
    }

    #[test]
    fn solution_runs_forward_from_root() {
        let mut mtr = Mtr::new(goal_at(2.0, 0.0));
        let mut graph = TestGraph::new();
        let root = graph.add_vertex(state(0.0, 0.0));
        graph.set_root(Some(root));
        let mid = graph.add_vertex(state(1.0, 0.0));
        let goal = graph.add_vertex(state(2.0, 0.0));
        graph.vertex_mut(goal).set_reaches_goal(true);
        graph.vertex_mut(goal).set_total_cost(2.0);

        // Each edge carries one intermediate state and two inputs.
        graph.add_edge(
            root,
            mid,
            Trajectory::new(vec![state(0.5, 0.0)], vec![TimedInput(0.5), TimedInput(0.5)]),
            1.0,
        );
        graph.add_edge(
            mid,
            goal,
            Trajectory::new(vec![state(1.5, 0.0)], vec![TimedInput(0.5), TimedInput(0.5)]),
            1.0,
        );

        CostEvaluator::update_vertex_cost(&mut mtr, &graph, goal);
        let solution = mtr.solution(&graph).unwrap();
        assert_eq!(
            solution.states,
            vec![
                state(0.0, 0.0),
                state(0.5, 0.0),
                state(1.0, 0.0),
                state(1.5, 0.0),
                state(2.0, 0.0),
            ]
        );
        assert_eq!(solution.inputs.len(), 4);
        assert_relative_eq!(solution.duration::<f64>(), 2.0);
    }

    #[test]
    fn equal_cost_replaces_tracked_vertex() {
        let mut mtr = Mtr::new(goal_at(0.0, 0.0));
        let mut graph = TestGraph::new();
        let a = graph.add_vertex(state(0.0, 0.0));
        graph.set_root(Some(a));
        graph.vertex_mut(a).set_reaches_goal(true);
        graph.vertex_mut(a).set_total_cost(3.0);
        CostEvaluator::update_vertex_cost(&mut mtr, &graph, a);
        assert_eq!(mtr.min_cost_vertex(), Some(a));

        let b = graph.add_vertex(state(0.1, 0.0));
        graph.vertex_mut(b).set_reaches_goal(true);
        graph.vertex_mut(b).set_total_cost(3.0);
        CostEvaluator::update_vertex_cost(&mut mtr, &graph, b);
        assert_eq!(mtr.min_cost_vertex(), Some(b));

        // A worse vertex never takes over.
        let c = graph.add_vertex(state(0.2, 0.0));
        graph.vertex_mut(c).set_reaches_goal(true);
        graph.vertex_mut(c).set_total_cost(4.0);
        CostEvaluator::update_vertex_cost(&mut mtr, &graph, c);
        assert_eq!(mtr.min_cost_vertex(), Some(b));
    }

    #[test]
    fn tracked_vertex_is_dropped_on_removal() {
        let mut mtr = Mtr::new(goal_at(0.0, 0.0));
        let mut graph = TestGraph::new();
        let a = graph.add_vertex(state(0.0, 0.0));
        graph.vertex_mut(a).set_reaches_goal(true);
        CostEvaluator::update_vertex_cost(&mut mtr, &graph, a);
        assert!(mtr.best_cost().is_some());

        let vertex = graph.vertex(a).clone();
        ModelChecker::notify_vertex_removed(&mut mtr, a, &vertex);
        assert!(mtr.best_cost().is_none());
        assert!(mtr.solution(&graph).is_none());
    }

    #[test]
    fn default_cost_is_total_time() {
        let mtr = Mtr::new(goal_at(0.0, 0.0));
        let trajectory = Trajectory::new(
            vec![state(1.0, 0.0), state(2.0, 0.0)],
            vec![TimedInput(1.5), TimedInput(2.5)],
        );
        let cost = mtr.evaluate(&state(0.0, 0.0), &trajectory, &state(2.0, 0.0));
        assert_relative_eq!(cost, 4.0);
    }
}
