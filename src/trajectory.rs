use num_traits::Float;
use serde::{Deserialize, Serialize};

/// A control input applied over a time interval.
pub trait Input<F> {
    /// Duration of the interval over which the input is applied.
    fn duration(&self) -> F;
}

/// The simplest input carrier: a bare duration.
///
/// Kinematic extenders that move at unit speed emit one `TimedInput` per
/// interpolation segment, so the total duration of a trajectory equals its
/// length.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimedInput<F>(pub F);

impl<F: Float> Input<F> for TimedInput<F> {
    fn duration(&self) -> F {
        self.0
    }
}

/// A dynamically feasible motion: co-indexed sequences of states and
/// inputs, where applying `inputs[i]` moves the system onto `states[i]`.
///
/// An extender returns a trajectory whose states exclude the start state
/// and include the endpoint, so `inputs.len() == states.len()`. When a
/// trajectory becomes an edge payload, the endpoint state moves into the
/// destination vertex and the edge keeps only the intermediate states.
///
/// A trajectory is owned by the edge that carries it; cloning is explicit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trajectory<S, U> {
    pub states: Vec<S>,
    pub inputs: Vec<U>,
}

impl<S, U> Trajectory<S, U> {
    pub fn new(states: Vec<S>, inputs: Vec<U>) -> Self {
        Self { states, inputs }
    }

    pub fn empty() -> Self {
        Self {
            states: Vec::new(),
            inputs: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty() && self.inputs.is_empty()
    }

    pub fn last_state(&self) -> Option<&S> {
        self.states.last()
    }

    /// Total duration of the carried inputs.
    pub fn duration<F: Float>(&self) -> F
    where
        U: Input<F>,
    {
        self.inputs
            .iter()
            .fold(F::zero(), |acc, input| acc + input.duration())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn duration_sums_inputs() {
        let trajectory: Trajectory<f64, TimedInput<f64>> = Trajectory::new(
            vec![1.0, 2.0, 3.0],
            vec![TimedInput(0.5), TimedInput(0.25), TimedInput(1.0)],
        );
        assert_relative_eq!(trajectory.duration::<f64>(), 1.75);
    }

    #[test]
    fn empty_trajectory() {
        let trajectory: Trajectory<f64, TimedInput<f64>> = Trajectory::empty();
        assert!(trajectory.is_empty());
        assert!(trajectory.last_state().is_none());
        assert_relative_eq!(trajectory.duration::<f64>(), 0.0);
    }
}
