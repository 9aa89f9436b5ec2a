use half::f16;

use crate::backend::ComputeBackend;
use crate::dtype::DType;
use crate::error::{Result, TensorError};
use crate::shape::Shape;

/// A dense, row-major 2D buffer of `f32` values with explicit extents.
///
/// Every element in `[0, rows) x [0, cols)` is present; there are no ragged
/// rows and no strides other than the contiguous ones. The buffer is owned by
/// whoever created it; kernels borrow operands immutably and the output
/// mutably, so an output can never alias one of its operands.
#[derive(Debug, Clone, PartialEq)]
pub struct Dense2D {
    data: Vec<f32>,
    shape: Shape,
}

impl Dense2D {
    /// Create a buffer from row-major data and a shape.
    ///
    /// # Errors
    /// Returns `LengthMismatch` if `data.len() != shape.numel()`.
    pub fn new(data: Vec<f32>, shape: Shape) -> Result<Self> {
        shape.check_len(data.len())?;
        Ok(Dense2D { data, shape })
    }

    /// Create a buffer with every element set to `value`.
    pub fn full(shape: Shape, value: f32) -> Self {
        Dense2D {
            data: vec![value; shape.numel()],
            shape,
        }
    }

    pub fn zeros(shape: Shape) -> Self {
        Self::full(shape, 0.0)
    }

    pub fn ones(shape: Shape) -> Self {
        Self::full(shape, 1.0)
    }

    /// The `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        Self::from_fn(Shape::square(n), |r, c| if r == c { 1.0 } else { 0.0 })
    }

    /// Create a buffer by evaluating `f(row, col)` for every cell in
    /// row-major order.
    pub fn from_fn<F>(shape: Shape, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f32,
    {
        let mut data = Vec::with_capacity(shape.numel());
        for r in 0..shape.rows() {
            for c in 0..shape.cols() {
                data.push(f(r, c));
            }
        }
        Dense2D { data, shape }
    }

    /// Create a buffer from nested rows.
    ///
    /// # Errors
    /// Returns `ShapeMismatch` if the rows are not all the same length.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            if row.len() != cols {
                return Err(TensorError::ShapeMismatch {
                    expected: [rows.len(), cols],
                    got: [rows.len(), row.len()],
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Dense2D {
            data,
            shape: Shape::new(rows.len(), cols),
        })
    }

    /// Create a buffer from half-precision data, widening every element to `f32`.
    pub fn from_f16(data: &[f16], shape: Shape) -> Result<Self> {
        shape.check_len(data.len())?;
        Ok(Dense2D {
            data: data.iter().map(|v| v.to_f32()).collect(),
            shape,
        })
    }

    /// Narrows every element to half precision.
    pub fn to_f16_vec(&self) -> Vec<f16> {
        self.data.iter().map(|&v| f16::from_f32(v)).collect()
    }

    /// Returns a copy whose elements have been rounded through `dtype`.
    ///
    /// For `F32` this is a plain clone; for `F16` each value is narrowed and
    /// widened again, so the buffer holds exactly the values a half-precision
    /// caller could have supplied.
    pub fn round_to(&self, dtype: DType) -> Dense2D {
        match dtype {
            DType::F32 => self.clone(),
            DType::F16 => Dense2D {
                data: self
                    .data
                    .iter()
                    .map(|&v| f16::from_f32(v).to_f32())
                    .collect(),
                shape: self.shape,
            },
        }
    }

    /// Size of this buffer's contents when stored as `dtype`.
    pub fn nbytes(&self, dtype: DType) -> usize {
        self.shape.numel() * dtype.size_in_bytes()
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Returns the underlying row-major data.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Returns the element at `(row, col)`, or `None` if out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        self.shape.offset(row, col).map(|i| self.data[i])
    }

    /// Returns row `r` as a slice, or `None` if out of bounds.
    pub fn row(&self, r: usize) -> Option<&[f32]> {
        if r >= self.shape.rows() {
            return None;
        }
        let cols = self.shape.cols();
        Some(&self.data[r * cols..(r + 1) * cols])
    }

    /// Matrix multiplication `out = self @ other` on the given backend.
    ///
    /// `self` is `[m, k]`, `other` is `[k, n]`, and `out` must already be
    /// `[m, n]`. Shapes are checked before anything is written.
    pub fn matmul_into(
        &self,
        other: &Dense2D,
        out: &mut Dense2D,
        backend: &dyn ComputeBackend,
    ) -> Result<()> {
        let out_shape = Shape::matmul_output(self.shape, other.shape)?;
        out.shape.expect(out_shape)?;
        backend.matmul(&self.data, self.shape, &other.data, other.shape, &mut out.data)
    }

    /// Valid-mode cross-correlation `out = self * kernel` on the given backend.
    ///
    /// `out` must already be `[h - kh + 1, w - kw + 1]`.
    pub fn conv2d_into(
        &self,
        kernel: &Dense2D,
        out: &mut Dense2D,
        backend: &dyn ComputeBackend,
    ) -> Result<()> {
        let out_shape = Shape::valid_conv_output(self.shape, kernel.shape)?;
        out.shape.expect(out_shape)?;
        backend.conv2d(
            &self.data,
            self.shape,
            &kernel.data,
            kernel.shape,
            &mut out.data,
        )
    }
}
