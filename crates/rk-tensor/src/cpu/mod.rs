pub mod conv2d;
pub mod matmul;

use log::trace;

use crate::backend::ComputeBackend;
use crate::error::Result;
use crate::shape::Shape;

/// Pure-Rust CPU compute backend.
///
/// Implements both kernels with straightforward nested loops, optimized for
/// correctness rather than peak performance. This is the reference every
/// other backend is measured against.
#[derive(Debug, Clone)]
pub struct CpuBackend;

impl CpuBackend {
    pub fn new() -> Self {
        CpuBackend
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeBackend for CpuBackend {
    fn name(&self) -> &str {
        "cpu"
    }

    fn matmul(
        &self,
        a: &[f32],
        a_shape: Shape,
        b: &[f32],
        b_shape: Shape,
        c: &mut [f32],
    ) -> Result<()> {
        a_shape.check_len(a.len())?;
        b_shape.check_len(b.len())?;
        let c_shape = Shape::matmul_output(a_shape, b_shape)?;
        c_shape.check_len(c.len())?;

        trace!("cpu matmul {} @ {} -> {}", a_shape, b_shape, c_shape);
        matmul::matmul_ref(a, b, c, a_shape.rows(), a_shape.cols(), b_shape.cols());
        Ok(())
    }

    fn conv2d(
        &self,
        input: &[f32],
        input_shape: Shape,
        kernel: &[f32],
        kernel_shape: Shape,
        output: &mut [f32],
    ) -> Result<()> {
        input_shape.check_len(input.len())?;
        kernel_shape.check_len(kernel.len())?;
        let out_shape = Shape::valid_conv_output(input_shape, kernel_shape)?;
        out_shape.check_len(output.len())?;

        trace!(
            "cpu conv2d {} * {} -> {}",
            input_shape,
            kernel_shape,
            out_shape
        );
        conv2d::conv2d_valid(
            input,
            input_shape.rows(),
            input_shape.cols(),
            kernel,
            kernel_shape.rows(),
            kernel_shape.cols(),
            output,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TensorError;

    fn backend() -> CpuBackend {
        CpuBackend::new()
    }

    #[test]
    fn test_matmul_identity() {
        let b = backend();
        // 2x2 identity @ [1,2;3,4]
        let a = vec![1.0, 0.0, 0.0, 1.0];
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let mut c = vec![0.0; 4];
        b.matmul(&a, Shape::square(2), &x, Shape::square(2), &mut c)
            .unwrap();
        assert_eq!(c, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_matmul_basic() {
        let b = backend();
        // [1,2;3,4] @ [5,6;7,8] = [19,22;43,50]
        let a = vec![1.0, 2.0, 3.0, 4.0];
        let x = vec![5.0, 6.0, 7.0, 8.0];
        let mut c = vec![0.0; 4];
        b.matmul(&a, Shape::square(2), &x, Shape::square(2), &mut c)
            .unwrap();
        assert_eq!(c, vec![19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_matmul_inner_dim_mismatch_leaves_output() {
        let b = backend();
        let a = vec![1.0; 3];
        let x = vec![1.0; 4];
        let mut c = vec![-1.0; 2];
        let err = b
            .matmul(&a, Shape::new(1, 3), &x, Shape::new(2, 2), &mut c)
            .unwrap_err();
        assert!(matches!(err, TensorError::ShapeMismatch { .. }));
        assert_eq!(c, vec![-1.0; 2]);
    }

    #[test]
    fn test_matmul_length_mismatch() {
        let b = backend();
        let mut c = vec![0.0; 4];
        let err = b
            .matmul(&[1.0; 3], Shape::square(2), &[1.0; 4], Shape::square(2), &mut c)
            .unwrap_err();
        assert!(matches!(err, TensorError::LengthMismatch { len: 3, .. }));

        let mut short = vec![0.0; 3];
        assert!(b
            .matmul(&[1.0; 4], Shape::square(2), &[1.0; 4], Shape::square(2), &mut short)
            .is_err());
    }

    #[test]
    fn test_matmul_empty() {
        let b = backend();
        let mut c: Vec<f32> = vec![];
        b.matmul(&[], Shape::square(0), &[], Shape::square(0), &mut c)
            .unwrap();
        assert!(c.is_empty());
    }

    #[test]
    fn test_conv2d_basic() {
        let b = backend();
        let mut out = vec![0.0; 4];
        b.conv2d(&[1.0; 9], Shape::square(3), &[1.0; 4], Shape::square(2), &mut out)
            .unwrap();
        assert_eq!(out, vec![4.0; 4]);
    }

    #[test]
    fn test_conv2d_full_overlap() {
        let b = backend();
        let input = vec![1.0, 2.0, 3.0, 4.0];
        let kernel = vec![0.5, -1.0, 2.0, 0.25];
        let mut out = vec![0.0; 1];
        b.conv2d(&input, Shape::square(2), &kernel, Shape::square(2), &mut out)
            .unwrap();
        assert_eq!(out, vec![0.5 - 2.0 + 6.0 + 1.0]);
    }

    #[test]
    fn test_conv2d_kernel_too_large_leaves_output() {
        let b = backend();
        let mut out = vec![7.0; 1];
        let err = b
            .conv2d(&[1.0; 4], Shape::square(2), &[1.0; 9], Shape::square(3), &mut out)
            .unwrap_err();
        assert!(matches!(err, TensorError::InvalidKernelSize { .. }));
        assert_eq!(out, vec![7.0]);
    }

    #[test]
    fn test_conv2d_wrong_output_len() {
        let b = backend();
        let mut out = vec![0.0; 9];
        let err = b
            .conv2d(&[1.0; 9], Shape::square(3), &[1.0; 4], Shape::square(2), &mut out)
            .unwrap_err();
        assert!(matches!(err, TensorError::LengthMismatch { len: 9, .. }));
    }
}
