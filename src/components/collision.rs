use crate::components::CollisionChecker;
use crate::obstacles::AnalyticObstacle;
use crate::state::RealVectorState;
use num_traits::Float;
use std::marker::PhantomData;

/// A collision checker for obstacle-free problems: everything is valid.
pub struct FreeSpace<S> {
    _marker: PhantomData<S>,
}

impl<S> FreeSpace<S> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<S> Default for FreeSpace<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> CollisionChecker<S> for FreeSpace<S> {
    fn is_state_valid(&self, _state: &S) -> bool {
        true
    }

    fn is_trajectory_valid(&self, _start: &S, _states: &[S]) -> bool {
        true
    }
}

/// Checks states and motions against a set of analytic obstacles.
///
/// A motion is valid when no trajectory state (endpoint included) lies in
/// an obstacle and no segment between consecutive states crosses one. The
/// segment tests are exact, so the check does not depend on the extender's
/// interpolation resolution.
pub struct AnalyticCollisionChecker<F, const N: usize> {
    obstacles: Vec<Box<dyn AnalyticObstacle<F, N>>>,
}

impl<F: Float, const N: usize> AnalyticCollisionChecker<F, N> {
    pub fn new(obstacles: Vec<Box<dyn AnalyticObstacle<F, N>>>) -> Self {
        Self { obstacles }
    }

    pub fn add_obstacle(&mut self, obstacle: Box<dyn AnalyticObstacle<F, N>>) {
        self.obstacles.push(obstacle);
    }

    fn segment_is_free(&self, a: &RealVectorState<F, N>, b: &RealVectorState<F, N>) -> bool {
        self.obstacles
            .iter()
            .all(|obstacle| !obstacle.intersects_segment(a, b))
    }
}

impl<F: Float, const N: usize> CollisionChecker<RealVectorState<F, N>>
    for AnalyticCollisionChecker<F, N>
{
    fn is_state_valid(&self, state: &RealVectorState<F, N>) -> bool {
        self.obstacles.iter().all(|obstacle| !obstacle.contains(state))
    }

    fn is_trajectory_valid(
        &self,
        start: &RealVectorState<F, N>,
        states: &[RealVectorState<F, N>],
    ) -> bool {
        let mut previous = start;
        for state in states {
            if !self.is_state_valid(state) || !self.segment_is_free(previous, state) {
                return false;
            }
            previous = state;
        }
        true
    }
}
