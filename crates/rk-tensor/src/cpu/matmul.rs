//! Reference matrix multiplication.

/// Computes `c = a @ b` for row-major `a: [m, k]`, `b: [k, n]`, `c: [m, n]`.
///
/// Each output cell gets its own scalar accumulator starting at 0.0, and
/// `p` runs from 0 to `k - 1` in order, so results are bit-reproducible
/// against any implementation that keeps the same summation order. `c` is
/// overwritten, never accumulated into.
///
/// Callers must have checked the slice lengths; this only indexes.
pub fn matmul_ref(a: &[f32], b: &[f32], c: &mut [f32], m: usize, k: usize, n: usize) {
    for i in 0..m {
        for j in 0..n {
            let mut sum = 0.0f32;
            for p in 0..k {
                sum += a[i * k + p] * b[p * n + j];
            }
            c[i * n + j] = sum;
        }
    }
}
