use crate::error::PlannerError;
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Configuration shared by the RRG and RRT* planners.
///
/// `phase` selects how much work an iteration performs:
/// - `0` — pure tree extension (plain RRT behavior),
/// - `1` — additionally connect the new vertex to its near-set in both
///   directions (RRG),
/// - `2` — additionally choose the best parent and rewire the near-set
///   (full RRT*; honored by [`RrtStar`](crate::planners::RrtStar) only).
///
/// `gamma`, `dimension` and `max_radius` drive the shrinking near-radius
/// schedule `min(gamma * (ln n / n)^(1/dimension), max_radius)` that
/// preserves the asymptotic-optimality guarantees of RRT*.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Parameters<F> {
    phase: u8,
    gamma: F,
    dimension: usize,
    max_radius: F,
}

impl<F: Float> Parameters<F> {
    /// Validates and builds a parameter record.
    pub fn new(phase: u8, gamma: F, dimension: usize, max_radius: F) -> Result<Self, PlannerError> {
        if phase > 2 {
            return Err(PlannerError::InvalidParameter(format!(
                "phase must be 0, 1 or 2, got {}",
                phase
            )));
        }
        if !(gamma.is_finite() && gamma > F::zero()) {
            return Err(PlannerError::InvalidParameter(
                "gamma must be finite and positive".to_string(),
            ));
        }
        if dimension == 0 {
            return Err(PlannerError::InvalidParameter(
                "dimension must be at least 1".to_string(),
            ));
        }
        if !(max_radius.is_finite() && max_radius > F::zero()) {
            return Err(PlannerError::InvalidParameter(
                "max_radius must be finite and positive".to_string(),
            ));
        }
        Ok(Self {
            phase,
            gamma,
            dimension,
            max_radius,
        })
    }

    pub fn phase(&self) -> u8 {
        self.phase
    }

    pub fn gamma(&self) -> F {
        self.gamma
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn max_radius(&self) -> F {
        self.max_radius
    }

    /// Near-set radius for a graph with `vertex_count` vertices.
    pub fn near_radius(&self, vertex_count: usize) -> F {
        let n = F::from(vertex_count.max(1)).unwrap_or_else(F::one);
        let d = F::from(self.dimension).unwrap_or_else(F::one);
        let radius = self.gamma * (n.ln() / n).powf(F::one() / d);
        radius.min(self.max_radius)
    }
}
