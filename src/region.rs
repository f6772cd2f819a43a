use crate::state::RealVectorState;
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// An axis-aligned box in state space, described by its center and its
/// half-extents along each axis.
///
/// A state `x` lies inside the region iff `|x[i] - center[i]| <= size[i]`
/// for every dimension `i`. Goal regions and sampler supports are both
/// expressed this way.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region<F, const N: usize> {
    center: RealVectorState<F, N>,
    size: RealVectorState<F, N>,
}

impl<F: Float, const N: usize> Region<F, N> {
    /// Constructs a region from a center and per-axis half-extents.
    pub fn new(center: RealVectorState<F, N>, size: RealVectorState<F, N>) -> Self {
        Self { center, size }
    }

    pub fn center(&self) -> &RealVectorState<F, N> {
        &self.center
    }

    /// Per-axis half-extents.
    pub fn size(&self) -> &RealVectorState<F, N> {
        &self.size
    }

    /// Checks whether a state lies inside the region.
    pub fn contains(&self, state: &RealVectorState<F, N>) -> bool {
        (0..N).all(|i| (state[i] - self.center[i]).abs() <= self.size[i])
    }

    /// Smallest coordinates of the region.
    pub fn min_corner(&self) -> RealVectorState<F, N> {
        self.center - self.size
    }

    /// Largest coordinates of the region.
    pub fn max_corner(&self) -> RealVectorState<F, N> {
        self.center + self.size
    }
}
