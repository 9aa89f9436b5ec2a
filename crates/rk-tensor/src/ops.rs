//! Free-function entry points over the reference [`CpuBackend`].
//!
//! These mirror the plain `matmul(A, B) -> C` and `conv2d(input, kernel) ->
//! output` call boundary. The `_into` variants write into a caller-owned
//! output and never allocate; the others allocate the output for you.

use crate::cpu::CpuBackend;
use crate::dense::Dense2D;
use crate::error::{Result, TensorError};
use crate::shape::Shape;

fn require_square(shape: Shape) -> Result<usize> {
    if !shape.is_square() {
        return Err(TensorError::ShapeMismatch {
            expected: [shape.rows(), shape.rows()],
            got: shape.dims(),
        });
    }
    Ok(shape.rows())
}

/// `c = a @ b` for square operands of the same dimension `N`.
///
/// Fails with `ShapeMismatch` if `a` or `b` is not square, if their
/// dimensions differ, or if `c` is not `N x N`. Nothing is written on error.
pub fn matmul_into(a: &Dense2D, b: &Dense2D, c: &mut Dense2D) -> Result<()> {
    let n = require_square(a.shape())?;
    require_square(b.shape())?;
    b.shape().expect(Shape::square(n))?;
    a.matmul_into(b, c, &CpuBackend::new())
}

/// Allocating form of [`matmul_into`].
pub fn matmul(a: &Dense2D, b: &Dense2D) -> Result<Dense2D> {
    let mut c = Dense2D::zeros(Shape::square(a.shape().rows()));
    matmul_into(a, b, &mut c)?;
    Ok(c)
}

/// Valid-mode cross-correlation of `input` with `kernel` into `output`.
///
/// Fails with `InvalidKernelSize` if the kernel does not fit inside the
/// input, and with `ShapeMismatch` if `output` is not
/// `(H - KH + 1) x (W - KW + 1)`. Nothing is written on error.
pub fn conv2d_into(input: &Dense2D, kernel: &Dense2D, output: &mut Dense2D) -> Result<()> {
    input.conv2d_into(kernel, output, &CpuBackend::new())
}

/// Allocating form of [`conv2d_into`].
pub fn conv2d(input: &Dense2D, kernel: &Dense2D) -> Result<Dense2D> {
    let out_shape = Shape::valid_conv_output(input.shape(), kernel.shape())?;
    let mut output = Dense2D::zeros(out_shape);
    conv2d_into(input, kernel, &mut output)?;
    Ok(output)
}
