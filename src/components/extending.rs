use crate::components::{Extender, Extension};
use crate::error::PlannerError;
use crate::state::RealVectorState;
use crate::trajectory::{TimedInput, Trajectory};
use num_traits::Float;

/// Extends along the straight line between two states at unit speed.
///
/// The extension is truncated at `max_step`, so the endpoint equals the
/// target exactly only when the target lies within range. Intermediate
/// states are interpolated at most `resolution` apart, which is the
/// granularity at which collision checkers observe the motion.
pub struct StraightLineExtender<F> {
    max_step: F,
    resolution: F,
}

impl<F: Float> StraightLineExtender<F> {
    pub fn new(max_step: F, resolution: F) -> Result<Self, PlannerError> {
        if !(max_step.is_finite() && max_step > F::zero()) {
            return Err(PlannerError::InvalidParameter(
                "max_step must be finite and positive".to_string(),
            ));
        }
        if !(resolution.is_finite() && resolution > F::zero()) {
            return Err(PlannerError::InvalidParameter(
                "resolution must be finite and positive".to_string(),
            ));
        }
        Ok(Self {
            max_step,
            resolution,
        })
    }

    pub fn max_step(&self) -> F {
        self.max_step
    }
}

impl<F: Float, const N: usize> Extender<RealVectorState<F, N>, TimedInput<F>>
    for StraightLineExtender<F>
{
    fn extend(
        &self,
        from: &RealVectorState<F, N>,
        to: &RealVectorState<F, N>,
    ) -> Option<Extension<RealVectorState<F, N>, TimedInput<F>>> {
        let distance = from.euclidean_distance(to);
        if !distance.is_finite() {
            return None;
        }
        if distance == F::zero() {
            return Some(Extension {
                trajectory: Trajectory::new(vec![*to], vec![TimedInput(F::zero())]),
                exact: true,
            });
        }

        let exact = distance <= self.max_step;
        let reach = if exact { distance } else { self.max_step };
        let steps = (reach / self.resolution).ceil().to_usize().unwrap_or(1).max(1);
        let step_fraction = reach / distance / F::from(steps).unwrap();

        let mut states = Vec::with_capacity(steps);
        let mut inputs = Vec::with_capacity(steps);
        let step_length = reach / F::from(steps).unwrap();
        for k in 1..=steps {
            states.push(from.lerp(to, step_fraction * F::from(k).unwrap()));
            inputs.push(TimedInput(step_length));
        }
        if exact {
            // Pin the endpoint so exact arrival survives rounding.
            let last = states.len() - 1;
            states[last] = *to;
        }

        Some(Extension {
            trajectory: Trajectory::new(states, inputs),
            exact,
        })
    }
}
