use std::fmt::Debug;

use crate::error::Result;
use crate::shape::Shape;

/// Trait for pluggable compute backends (the CPU reference, and any tiled,
/// vectorized or offloaded replacement checked against it).
///
/// Operands are passed as row-major slices alongside their shapes; results
/// are written into a caller-owned output slice. A backend never allocates
/// the output and never retains state between calls.
///
/// Every implementation must validate slice lengths and shape compatibility
/// before writing a single output cell: a failed call leaves `output`
/// untouched.
pub trait ComputeBackend: Send + Sync + Debug {
    /// Returns the name of this backend (e.g., "cpu").
    fn name(&self) -> &str;

    /// Matrix multiplication: C = A @ B.
    ///
    /// - `a`: row-major data of shape `[m, k]`
    /// - `b`: row-major data of shape `[k, n]`
    /// - `c`: row-major output of shape `[m, n]`, every cell overwritten
    fn matmul(
        &self,
        a: &[f32],
        a_shape: Shape,
        b: &[f32],
        b_shape: Shape,
        c: &mut [f32],
    ) -> Result<()>;

    /// Valid-mode 2D cross-correlation (no padding, stride 1, no kernel flip).
    ///
    /// - `input`: row-major data of shape `[h, w]`
    /// - `kernel`: row-major data of shape `[kh, kw]` with `kh <= h`, `kw <= w`
    /// - `output`: row-major output of shape `[h - kh + 1, w - kw + 1]`
    fn conv2d(
        &self,
        input: &[f32],
        input_shape: Shape,
        kernel: &[f32],
        kernel_shape: Shape,
        output: &mut [f32],
    ) -> Result<()>;
}
