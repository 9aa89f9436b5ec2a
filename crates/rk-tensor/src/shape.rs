use crate::error::{Result, TensorError};
use std::fmt;

/// Extents of a dense, row-major 2D buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    rows: usize,
    cols: usize,
}

impl Shape {
    /// Create a new shape from its row and column counts.
    pub fn new(rows: usize, cols: usize) -> Self {
        Shape { rows, cols }
    }

    /// Create an `n x n` shape.
    pub fn square(n: usize) -> Self {
        Shape { rows: n, cols: n }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of elements (`rows * cols`).
    ///
    /// Saturates at `usize::MAX`, which no real buffer length can equal.
    /// Extents from untrusted callers go through `checked_numel`.
    pub fn numel(&self) -> usize {
        self.rows.saturating_mul(self.cols)
    }

    /// `rows * cols`, or `None` if the product overflows `usize`.
    pub fn checked_numel(&self) -> Option<usize> {
        self.rows.checked_mul(self.cols)
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Returns `[rows, cols]`, the form used in error payloads.
    pub fn dims(&self) -> [usize; 2] {
        [self.rows, self.cols]
    }

    /// Row-major contiguous strides: `[cols, 1]`.
    pub fn strides(&self) -> [usize; 2] {
        [self.cols, 1]
    }

    /// Flat offset of `(row, col)` in row-major storage, or `None` when the
    /// index lies outside `[0, rows) x [0, cols)`.
    pub fn offset(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.rows && col < self.cols {
            let [row_stride, col_stride] = self.strides();
            Some(row * row_stride + col * col_stride)
        } else {
            None
        }
    }

    /// Output shape of `a @ b`.
    ///
    /// Fails with `ShapeMismatch` when the inner dimensions differ. The
    /// `expected` payload is the shape `b` would need to have.
    pub fn matmul_output(a: Shape, b: Shape) -> Result<Shape> {
        if a.cols != b.rows {
            return Err(TensorError::ShapeMismatch {
                expected: [a.cols, b.cols],
                got: b.dims(),
            });
        }
        Ok(Shape::new(a.rows, b.cols))
    }

    /// Output shape of a valid-mode (no padding, stride 1) correlation of
    /// `input` with `kernel`: `(H - KH + 1) x (W - KW + 1)`.
    ///
    /// Fails with `InvalidKernelSize` when the kernel is larger than the
    /// input in either dimension, or has a zero extent.
    pub fn valid_conv_output(input: Shape, kernel: Shape) -> Result<Shape> {
        if kernel.rows == 0
            || kernel.cols == 0
            || kernel.rows > input.rows
            || kernel.cols > input.cols
        {
            return Err(TensorError::InvalidKernelSize {
                input: input.dims(),
                kernel: kernel.dims(),
            });
        }
        Ok(Shape::new(
            input.rows - kernel.rows + 1,
            input.cols - kernel.cols + 1,
        ))
    }

    /// Returns `Ok(())` if `self == expected`, otherwise `ShapeMismatch`.
    pub fn expect(&self, expected: Shape) -> Result<()> {
        if *self != expected {
            return Err(TensorError::ShapeMismatch {
                expected: expected.dims(),
                got: self.dims(),
            });
        }
        Ok(())
    }

    /// Checks that a flat buffer of `len` elements can hold this shape exactly.
    ///
    /// Fails with `ShapeOverflow` when `rows * cols` does not fit in `usize`.
    pub fn check_len(&self, len: usize) -> Result<()> {
        let numel = self
            .checked_numel()
            .ok_or(TensorError::ShapeOverflow { shape: self.dims() })?;
        if len != numel {
            return Err(TensorError::LengthMismatch {
                len,
                shape: self.dims(),
                numel,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.rows, self.cols)
    }
}

impl From<(usize, usize)> for Shape {
    fn from((rows, cols): (usize, usize)) -> Self {
        Shape::new(rows, cols)
    }
}

impl From<[usize; 2]> for Shape {
    fn from([rows, cols]: [usize; 2]) -> Self {
        Shape::new(rows, cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_shape() {
        let s = Shape::new(2, 3);
        assert_eq!(s.rows(), 2);
        assert_eq!(s.cols(), 3);
        assert_eq!(s.numel(), 6);
        assert!(!s.is_square());
        assert!(Shape::square(4).is_square());
    }

    #[test]
    fn test_strides_and_offset() {
        let s = Shape::new(2, 3);
        assert_eq!(s.strides(), [3, 1]);
        assert_eq!(s.offset(0, 0), Some(0));
        assert_eq!(s.offset(1, 2), Some(5));
        assert_eq!(s.offset(2, 0), None);
        assert_eq!(s.offset(0, 3), None);
    }

    #[test]
    fn test_empty_shape() {
        let s = Shape::square(0);
        assert_eq!(s.numel(), 0);
        assert_eq!(s.offset(0, 0), None);
    }

    #[test]
    fn test_matmul_output() {
        let c = Shape::matmul_output(Shape::new(2, 3), Shape::new(3, 4)).unwrap();
        assert_eq!(c, Shape::new(2, 4));
    }

    #[test]
    fn test_matmul_output_mismatch() {
        let err = Shape::matmul_output(Shape::new(2, 3), Shape::new(2, 4)).unwrap_err();
        assert_eq!(
            err,
            TensorError::ShapeMismatch {
                expected: [3, 4],
                got: [2, 4]
            }
        );
    }

    #[test]
    fn test_valid_conv_output() {
        let out = Shape::valid_conv_output(Shape::square(5), Shape::square(3)).unwrap();
        assert_eq!(out, Shape::square(3));

        // Kernel as large as the input collapses to a single cell.
        let out = Shape::valid_conv_output(Shape::square(4), Shape::square(4)).unwrap();
        assert_eq!(out, Shape::square(1));

        let out = Shape::valid_conv_output(Shape::new(6, 4), Shape::new(2, 3)).unwrap();
        assert_eq!(out, Shape::new(5, 2));
    }

    #[test]
    fn test_valid_conv_output_rejects_oversized_kernel() {
        assert!(matches!(
            Shape::valid_conv_output(Shape::square(3), Shape::square(4)),
            Err(TensorError::InvalidKernelSize { .. })
        ));
        // Too wide, though short enough.
        assert!(matches!(
            Shape::valid_conv_output(Shape::new(5, 2), Shape::new(2, 3)),
            Err(TensorError::InvalidKernelSize { .. })
        ));
    }

    #[test]
    fn test_valid_conv_output_rejects_empty_kernel() {
        assert!(matches!(
            Shape::valid_conv_output(Shape::square(3), Shape::new(0, 2)),
            Err(TensorError::InvalidKernelSize { .. })
        ));
    }

    #[test]
    fn test_expect_and_check_len() {
        assert!(Shape::new(2, 2).expect(Shape::square(2)).is_ok());
        assert!(Shape::new(2, 3).expect(Shape::square(2)).is_err());
        assert!(Shape::new(2, 3).check_len(6).is_ok());
        assert_eq!(
            Shape::new(2, 3).check_len(5),
            Err(TensorError::LengthMismatch {
                len: 5,
                shape: [2, 3],
                numel: 6
            })
        );
    }

    #[test]
    fn test_overflowing_extents() {
        let s = Shape::new(usize::MAX, 2);
        assert_eq!(s.checked_numel(), None);
        assert_eq!(s.numel(), usize::MAX);
        assert_eq!(
            s.check_len(0),
            Err(TensorError::ShapeOverflow {
                shape: [usize::MAX, 2]
            })
        );
        // Wraps to zero under unchecked multiplication.
        assert!(Shape::new(1 << (usize::BITS - 1), 2).check_len(0).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Shape::new(3, 7).to_string(), "[3, 7]");
    }
}
