use num_traits::Float;
use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, Div, Index, IndexMut, Mul, Sub};

/// A state in N-dimensional Euclidean space.
///
/// The planner core treats states as opaque values; only plug-in
/// components (samplers, extenders, collision checkers, the reachability
/// checker) look inside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RealVectorState<F, const N: usize> {
    values: [F; N],
}

// The serde impls are written out because the derive cannot handle a
// const-generic array field. States serialize as a plain sequence of
// component values.

impl<F: Serialize, const N: usize> Serialize for RealVectorState<F, N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(N))?;
        for value in self.values.iter() {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

impl<'de, F: Deserialize<'de>, const N: usize> Deserialize<'de> for RealVectorState<F, N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StateVisitor<F, const N: usize>(PhantomData<F>);

        impl<'de, F: Deserialize<'de>, const N: usize> Visitor<'de> for StateVisitor<F, N> {
            type Value = RealVectorState<F, N>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "a sequence of {} components", N)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut values = Vec::with_capacity(N);
                for i in 0..N {
                    values.push(
                        seq.next_element()?
                            .ok_or_else(|| serde::de::Error::invalid_length(i, &self))?,
                    );
                }
                let values: [F; N] = values
                    .try_into()
                    .map_err(|_| serde::de::Error::invalid_length(N, &self))?;
                Ok(RealVectorState { values })
            }
        }

        deserializer.deserialize_seq(StateVisitor(PhantomData))
    }
}

impl<F: Float, const N: usize> RealVectorState<F, N> {
    /// Constructs a state from its component values.
    pub fn new(values: [F; N]) -> Self {
        Self { values }
    }

    /// Returns the components as a fixed-size array reference.
    pub fn values(&self) -> &[F; N] {
        &self.values
    }

    /// Returns the squared Euclidean distance to another state.
    pub fn euclidean_distance_squared(&self, other: &Self) -> F {
        let mut sum = F::zero();
        for i in 0..N {
            let d = self.values[i] - other.values[i];
            sum = sum + d * d;
        }
        sum
    }

    /// Returns the Euclidean distance to another state.
    pub fn euclidean_distance(&self, other: &Self) -> F {
        self.euclidean_distance_squared(other).sqrt()
    }

    /// Returns the Euclidean norm of the state viewed as a vector.
    pub fn norm(&self) -> F {
        let mut sum = F::zero();
        for i in 0..N {
            sum = sum + self.values[i] * self.values[i];
        }
        sum.sqrt()
    }

    /// Linear interpolation towards `other`: `self + t * (other - self)`.
    pub fn lerp(&self, other: &Self, t: F) -> Self {
        let mut values = [F::zero(); N];
        for i in 0..N {
            values[i] = self.values[i] + (other.values[i] - self.values[i]) * t;
        }
        Self { values }
    }
}

impl<F: Float, const N: usize> Index<usize> for RealVectorState<F, N> {
    type Output = F;

    fn index(&self, index: usize) -> &F {
        &self.values[index]
    }
}

impl<F: Float, const N: usize> IndexMut<usize> for RealVectorState<F, N> {
    fn index_mut(&mut self, index: usize) -> &mut F {
        &mut self.values[index]
    }
}

impl<F: Float, const N: usize> Add for RealVectorState<F, N> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let mut values = [F::zero(); N];
        for i in 0..N {
            values[i] = self.values[i] + rhs.values[i];
        }
        Self { values }
    }
}

impl<F: Float, const N: usize> Sub for RealVectorState<F, N> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        let mut values = [F::zero(); N];
        for i in 0..N {
            values[i] = self.values[i] - rhs.values[i];
        }
        Self { values }
    }
}

impl<F: Float, const N: usize> Mul<F> for RealVectorState<F, N> {
    type Output = Self;

    fn mul(self, rhs: F) -> Self {
        let mut values = [F::zero(); N];
        for i in 0..N {
            values[i] = self.values[i] * rhs;
        }
        Self { values }
    }
}

impl<F: Float, const N: usize> Div<F> for RealVectorState<F, N> {
    type Output = Self;

    fn div(self, rhs: F) -> Self {
        let mut values = [F::zero(); N];
        for i in 0..N {
            values[i] = self.values[i] / rhs;
        }
        Self { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn distances() {
        let a = RealVectorState::new([0.0f64, 0.0]);
        let b = RealVectorState::new([3.0, 4.0]);
        assert_relative_eq!(a.euclidean_distance_squared(&b), 25.0);
        assert_relative_eq!(a.euclidean_distance(&b), 5.0);
        assert_relative_eq!((b - a).norm(), 5.0);
    }

    #[test]
    fn lerp_endpoints() {
        let a = RealVectorState::new([1.0f64, -2.0]);
        let b = RealVectorState::new([5.0, 6.0]);
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
        let mid = a.lerp(&b, 0.5);
        assert_relative_eq!(mid[0], 3.0);
        assert_relative_eq!(mid[1], 2.0);
    }
}
