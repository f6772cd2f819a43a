//! End-to-end planning scenarios exercising the public API.

use sbmp::components::{
    GoalBiasedSampler, KdTreeDistanceEvaluator, LinearDistanceEvaluator, MinimumTimeReachability,
    StraightLineExtender,
};
use sbmp::components::{FreeSpace, Sampler};
use sbmp::{
    optimal_gamma, ModelChecker, Parameters, RealVectorState, Region, RrtStar, TimedInput,
    Trajectory,
};
use std::cell::RefCell;
use std::rc::Rc;

type State = RealVectorState<f64, 2>;
type Mtr = MinimumTimeReachability<f64, 2, TimedInput<f64>>;

fn state(x: f64, y: f64) -> State {
    RealVectorState::new([x, y])
}

/// Always returns the same sample; used to steer single iterations.
struct FixedSampler(State);

impl Sampler<State> for FixedSampler {
    fn sample(&mut self) -> State {
        self.0
    }
}

#[test]
fn root_inside_goal_is_a_zero_cost_solution() {
    let goal = Region::new(state(0.0, 0.0), state(0.5, 0.5));
    let mut star = RrtStar::new(
        Box::new(FixedSampler(state(1.0, 1.0))),
        LinearDistanceEvaluator::<f64, 2>::new(),
        Box::new(StraightLineExtender::new(1.0, 0.25).unwrap()),
        Box::new(FreeSpace::new()),
        Mtr::new(goal),
        Parameters::new(2, 10.0, 2, 2.0).unwrap(),
    );

    let root_state = state(0.2, -0.3);
    star.initialize(root_state).unwrap();

    assert_eq!(star.model_checker().best_cost(), Some(0.0));
    let solution = star.model_checker().solution(star.graph()).unwrap();
    assert_eq!(solution.states, vec![root_state]);
    assert!(solution.inputs.is_empty());
}

#[test]
fn rewire_replaces_parent_and_propagates_costs() {
    // Seed a deliberately suboptimal tree:
    //   A (root, origin) -> B at (0, 4) with an inflated cost of 9
    //   B -> C at (0, 9) with cost 5, so C starts at 14.
    // A fixed sample at (3, 0) creates D with parent A at cost 3. B falls
    // inside D's near-radius (|DB| = 5 < 6) and rewires to 3 + 5 = 8; C
    // follows by propagation to 13. C sits outside the radius
    // (|DC| > 9), so only propagation may touch it.
    let goal = Region::new(state(0.0, 9.0), state(0.5, 0.5));
    let mut star = RrtStar::new(
        Box::new(FixedSampler(state(3.0, 0.0))),
        LinearDistanceEvaluator::<f64, 2>::new(),
        Box::new(StraightLineExtender::new(100.0, 1.0).unwrap()),
        Box::new(FreeSpace::new()),
        Mtr::new(goal),
        Parameters::new(2, 1000.0, 2, 6.0).unwrap(),
    );

    let root = star.initialize(state(0.0, 0.0)).unwrap();
    let (b, _) = star
        .planner_mut()
        .insert_costed_vertex_trajectory(
            root,
            Trajectory::new(vec![state(0.0, 4.0)], vec![TimedInput(9.0)]),
            9.0,
            9.0,
        )
        .unwrap();
    let (c, _) = star
        .planner_mut()
        .insert_costed_vertex_trajectory(
            b,
            Trajectory::new(vec![state(0.0, 9.0)], vec![TimedInput(5.0)]),
            5.0,
            14.0,
        )
        .unwrap();

    // C reaches the goal, so the seeded solution costs 14.
    assert_eq!(star.model_checker().best_cost(), Some(14.0));

    let d = star.iteration().unwrap().expect("iteration should extend");

    let graph = star.graph();
    assert_eq!(graph.vertex(d).total_cost(), 3.0);
    assert_eq!(graph.parent(d), Some(root));

    // B was rewired through D.
    assert_eq!(graph.vertex(b).incoming().len(), 1);
    assert_eq!(graph.parent(b), Some(d));
    assert_eq!(graph.vertex(b).total_cost(), 8.0);

    // C kept its parent but received the propagated cost update, which
    // the reachability checker observed.
    assert_eq!(graph.parent(c), Some(b));
    assert_eq!(graph.vertex(c).total_cost(), 13.0);
    assert_eq!(star.model_checker().best_cost(), Some(13.0));

    graph.check_consistency().unwrap();
    for vertex in graph.vertex_ids() {
        let expected = usize::from(vertex != root);
        assert_eq!(graph.vertex(vertex).incoming().len(), expected);
    }
}

#[test]
fn straight_line_2d_converges_from_above() {
    let support = Region::new(state(0.0, 0.0), state(10.0, 10.0));
    let goal = Region::new(state(9.0, 9.0), state(0.5, 0.5));
    let gamma = optimal_gamma(400.0, 2).unwrap();

    let mut star = RrtStar::new(
        Box::new(GoalBiasedSampler::with_seed(support, goal, 0.05, 7).unwrap()),
        KdTreeDistanceEvaluator::<f64, 2>::new(),
        Box::new(StraightLineExtender::new(2.0, 0.5).unwrap()),
        Box::new(FreeSpace::new()),
        Mtr::new(goal),
        Parameters::new(2, gamma, 2, 3.0).unwrap(),
    );
    star.initialize(state(0.0, 0.0)).unwrap();

    let mut previous_best: Option<f64> = None;
    for _ in 0..4000 {
        star.iteration().unwrap();
        let best = star.model_checker().best_cost();
        if let (Some(prev), Some(curr)) = (previous_best, best) {
            assert!(curr <= prev, "best cost rose from {} to {}", prev, curr);
        }
        if best.is_some() {
            previous_best = best;
        }
    }

    let best = previous_best.expect("no solution found in 4000 iterations");
    // The straight-line optimum is sqrt(162) ~ 12.73; the tree converges
    // toward it from above.
    assert!(best >= 12.0, "best cost {} below the achievable minimum", best);
    assert!(best <= 16.0, "best cost {} did not converge", best);

    // The materialized solution runs from the root into the goal and its
    // duration matches the tracked cost.
    let solution = star.model_checker().solution(star.graph()).unwrap();
    assert_eq!(solution.states.first(), Some(&state(0.0, 0.0)));
    let last = solution.states.last().unwrap();
    assert!(goal.contains(last));
    let tracked = star
        .model_checker()
        .min_cost_vertex()
        .expect("solution implies a tracked vertex");
    assert_eq!(star.graph().vertex(tracked).state(), last);
    assert!((solution.duration::<f64>() - best).abs() < 1e-6);

    // The graph is still a well-formed tree.
    star.graph().check_consistency().unwrap();
    let root = star.root_vertex().unwrap();
    for vertex in star.graph().vertex_ids() {
        let expected = usize::from(vertex != root);
        assert_eq!(star.graph().vertex(vertex).incoming().len(), expected);
    }
}

#[test]
fn solution_callbacks_fire_on_improvements() {
    let support = Region::new(state(0.0, 0.0), state(10.0, 10.0));
    let goal = Region::new(state(8.0, 8.0), state(0.5, 0.5));

    let mut star = RrtStar::new(
        Box::new(GoalBiasedSampler::with_seed(support, goal, 0.1, 21).unwrap()),
        LinearDistanceEvaluator::<f64, 2>::new(),
        Box::new(StraightLineExtender::new(2.0, 0.5).unwrap()),
        Box::new(FreeSpace::new()),
        Mtr::new(goal),
        Parameters::new(2, 20.0, 2, 3.0).unwrap(),
    );

    let fired: Rc<RefCell<Vec<Trajectory<State, TimedInput<f64>>>>> =
        Rc::new(RefCell::new(Vec::new()));
    let sink = fired.clone();
    star.model_checker_mut()
        .register_solution_callback(Box::new(move |trajectory| {
            sink.borrow_mut().push(trajectory.clone());
        }));

    star.initialize(state(0.0, 0.0)).unwrap();
    for _ in 0..2000 {
        star.iteration().unwrap();
    }

    let fired = fired.borrow();
    assert!(!fired.is_empty(), "no solution callback fired");

    // Every reported trajectory is a complete root-to-goal path, and the
    // reported costs never increase.
    let mut previous = f64::INFINITY;
    for trajectory in fired.iter() {
        assert_eq!(trajectory.states.first(), Some(&state(0.0, 0.0)));
        assert!(goal.contains(trajectory.states.last().unwrap()));
        let cost = trajectory.duration::<f64>();
        assert!(cost <= previous, "callback cost rose from {} to {}", previous, cost);
        previous = cost;
    }

    // Callback arguments are deep copies: the first one still describes
    // the tree as it was, even after later rewires reshaped it.
    let first = &fired[0];
    assert_eq!(first.states.len(), first.inputs.len() + 1);
}
