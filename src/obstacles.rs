use crate::region::Region;
use crate::state::RealVectorState;
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// An obstacle with exact containment and segment-intersection tests.
pub trait AnalyticObstacle<F: Float, const N: usize> {
    /// Checks if a state lies inside the obstacle.
    fn contains(&self, state: &RealVectorState<F, N>) -> bool;

    /// Checks if the segment from `start` to `end` intersects the
    /// obstacle.
    fn intersects_segment(
        &self,
        start: &RealVectorState<F, N>,
        end: &RealVectorState<F, N>,
    ) -> bool;
}

/// A solid hypersphere.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SphericalObstacle<F, const N: usize> {
    center: RealVectorState<F, N>,
    radius: F,
}

impl<F: Float, const N: usize> SphericalObstacle<F, N> {
    pub fn new(center: RealVectorState<F, N>, radius: F) -> Self {
        Self { center, radius }
    }

    pub fn center(&self) -> &RealVectorState<F, N> {
        &self.center
    }

    pub fn radius(&self) -> F {
        self.radius
    }
}

impl<F: Float, const N: usize> AnalyticObstacle<F, N> for SphericalObstacle<F, N> {
    fn contains(&self, state: &RealVectorState<F, N>) -> bool {
        state.euclidean_distance_squared(&self.center) <= self.radius * self.radius
    }

    fn intersects_segment(
        &self,
        start: &RealVectorState<F, N>,
        end: &RealVectorState<F, N>,
    ) -> bool {
        // Closest point on the segment to the sphere center, clamped to
        // the segment's parameter range.
        let direction = *end - *start;
        let mut length_squared = F::zero();
        let mut t = F::zero();
        for i in 0..N {
            length_squared = length_squared + direction[i] * direction[i];
            t = t + (self.center[i] - (*start)[i]) * direction[i];
        }
        if length_squared == F::zero() {
            return self.contains(start);
        }
        t = (t / length_squared).max(F::zero()).min(F::one());
        let closest = start.lerp(end, t);
        self.contains(&closest)
    }
}

/// A solid axis-aligned box.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BoxObstacle<F, const N: usize> {
    region: Region<F, N>,
}

impl<F: Float, const N: usize> BoxObstacle<F, N> {
    pub fn new(region: Region<F, N>) -> Self {
        Self { region }
    }

    pub fn region(&self) -> &Region<F, N> {
        &self.region
    }
}

impl<F: Float, const N: usize> AnalyticObstacle<F, N> for BoxObstacle<F, N> {
    fn contains(&self, state: &RealVectorState<F, N>) -> bool {
        self.region.contains(state)
    }

    /// Liang-Barsky slab test: intersect the parametric segment
    /// `p(t) = start + t * (end - start)` with each axis slab and keep the
    /// running parameter interval.
    fn intersects_segment(
        &self,
        start: &RealVectorState<F, N>,
        end: &RealVectorState<F, N>,
    ) -> bool {
        let min = self.region.min_corner();
        let max = self.region.max_corner();
        let direction = *end - *start;
        let mut t_min = F::zero();
        let mut t_max = F::one();

        for i in 0..N {
            let s = (*start)[i];
            let d = direction[i];
            if d == F::zero() {
                // Parallel to the slab: either always inside it or never.
                if s < min[i] || s > max[i] {
                    return false;
                }
            } else {
                let inv_d = F::one() / d;
                let mut t1 = (min[i] - s) * inv_d;
                let mut t2 = (max[i] - s) * inv_d;
                if t1 > t2 {
                    std::mem::swap(&mut t1, &mut t2);
                }
                t_min = t_min.max(t1);
                t_max = t_max.min(t2);
                if t_min > t_max {
                    return false;
                }
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_containment_and_segments() {
        let sphere = SphericalObstacle::new(RealVectorState::new([0.0f64, 0.0]), 1.0);
        assert!(sphere.contains(&RealVectorState::new([0.5, 0.5])));
        assert!(!sphere.contains(&RealVectorState::new([1.0, 1.0])));

        // Passes straight through the center.
        assert!(sphere.intersects_segment(
            &RealVectorState::new([-2.0, 0.0]),
            &RealVectorState::new([2.0, 0.0]),
        ));
        // Clears the sphere entirely.
        assert!(!sphere.intersects_segment(
            &RealVectorState::new([-2.0, 2.0]),
            &RealVectorState::new([2.0, 2.0]),
        ));
        // Ends before reaching the sphere.
        assert!(!sphere.intersects_segment(
            &RealVectorState::new([-3.0, 0.0]),
            &RealVectorState::new([-2.0, 0.0]),
        ));
    }

    #[test]
    fn box_segments() {
        let obstacle = BoxObstacle::new(Region::new(
            RealVectorState::new([0.0f64, 0.0]),
            RealVectorState::new([1.0, 1.0]),
        ));
        assert!(obstacle.contains(&RealVectorState::new([0.9, -0.9])));
        assert!(!obstacle.contains(&RealVectorState::new([1.1, 0.0])));

        assert!(obstacle.intersects_segment(
            &RealVectorState::new([-2.0, 0.0]),
            &RealVectorState::new([2.0, 0.0]),
        ));
        assert!(!obstacle.intersects_segment(
            &RealVectorState::new([-2.0, 1.5]),
            &RealVectorState::new([2.0, 1.5]),
        ));
        // Diagonal clipping a corner.
        assert!(obstacle.intersects_segment(
            &RealVectorState::new([0.0, 2.0]),
            &RealVectorState::new([2.0, 0.0]),
        ));
    }
}
