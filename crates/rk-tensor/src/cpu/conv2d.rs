//! Reference valid-mode 2D convolution.
//!
//! "Convolution" here is cross-correlation: the kernel is applied as stored,
//! without a spatial flip.

/// Computes `output[i][j] = sum_{ki, kj} input[i + ki][j + kj] * kernel[ki][kj]`
/// over the positions where the kernel fully overlaps the input.
///
/// - `input`: row-major `[h, w]`
/// - `kernel`: row-major `[kh, kw]`, `1 <= kh <= h`, `1 <= kw <= w`
/// - `output`: row-major `[h - kh + 1, w - kw + 1]`, overwritten
///
/// The accumulator starts at 0.0 and walks `ki` then `kj` in increasing
/// order. Callers must have validated the extents.
pub fn conv2d_valid(
    input: &[f32],
    h: usize,
    w: usize,
    kernel: &[f32],
    kh: usize,
    kw: usize,
    output: &mut [f32],
) {
    let out_h = h - kh + 1;
    let out_w = w - kw + 1;
    for i in 0..out_h {
        for j in 0..out_w {
            let mut sum = 0.0f32;
            for ki in 0..kh {
                for kj in 0..kw {
                    sum += input[(i + ki) * w + (j + kj)] * kernel[ki * kw + kj];
                }
            }
            output[i * out_w + j] = sum;
        }
    }
}
