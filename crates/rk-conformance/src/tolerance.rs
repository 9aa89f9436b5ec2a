use approx::relative_eq;
use rk_tensor::Dense2D;

use crate::error::{ConformanceError, Result};

/// How closely a backend's output must track the expected values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Tolerance {
    /// Every element must have the same bit pattern. A backend that keeps the
    /// reference summation order is expected to meet this.
    #[default]
    BitExact,
    /// Elements may differ within `approx::relative_eq!` bounds. For backends
    /// that reorder the accumulation (tiling, SIMD lanes, GPU reductions).
    Relative { epsilon: f32, max_relative: f32 },
}

impl Tolerance {
    /// A relative tolerance suited to f32 sums of a few thousand terms.
    pub fn relaxed() -> Self {
        Tolerance::Relative {
            epsilon: 1e-5,
            max_relative: 1e-4,
        }
    }

    pub fn accepts(&self, expected: f32, got: f32) -> bool {
        match *self {
            Tolerance::BitExact => expected.to_bits() == got.to_bits(),
            Tolerance::Relative {
                epsilon,
                max_relative,
            } => relative_eq!(expected, got, epsilon = epsilon, max_relative = max_relative),
        }
    }

    /// Compares two buffers element by element, reporting the first cell
    /// that falls outside the tolerance.
    pub fn compare(&self, expected: &Dense2D, got: &Dense2D) -> Result<()> {
        if expected.shape() != got.shape() {
            return Err(ConformanceError::OutputShape {
                expected: expected.shape().dims(),
                got: got.shape().dims(),
            });
        }
        let cols = expected.shape().cols();
        for (i, (&e, &g)) in expected.data().iter().zip(got.data()).enumerate() {
            if !self.accepts(e, g) {
                return Err(ConformanceError::ValueMismatch {
                    row: i / cols,
                    col: i % cols,
                    expected: e,
                    got: g,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rk_tensor::Shape;

    #[test]
    fn test_bit_exact() {
        assert!(Tolerance::BitExact.accepts(1.0, 1.0));
        assert!(!Tolerance::BitExact.accepts(1.0, 1.0 + f32::EPSILON));
        // Signed zeros differ bitwise.
        assert!(!Tolerance::BitExact.accepts(0.0, -0.0));
    }

    #[test]
    fn test_relative() {
        let tol = Tolerance::relaxed();
        assert!(tol.accepts(1000.0, 1000.01));
        assert!(!tol.accepts(1000.0, 1001.0));
        assert!(tol.accepts(0.0, -0.0));
    }

    #[test]
    fn test_compare_reports_position() {
        let expected = Dense2D::zeros(Shape::new(2, 3));
        let mut got = expected.clone();
        got.data_mut()[4] = 1.0;
        assert_eq!(
            Tolerance::BitExact.compare(&expected, &got),
            Err(ConformanceError::ValueMismatch {
                row: 1,
                col: 1,
                expected: 0.0,
                got: 1.0
            })
        );
    }

    #[test]
    fn test_compare_shape() {
        let a = Dense2D::zeros(Shape::new(2, 3));
        let b = Dense2D::zeros(Shape::new(3, 2));
        assert!(matches!(
            Tolerance::relaxed().compare(&a, &b),
            Err(ConformanceError::OutputShape { .. })
        ));
    }
}
