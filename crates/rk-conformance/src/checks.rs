//! Individual property checks. Each one drives the backend under test through
//! the `ComputeBackend` seam and compares against known values or against
//! the reference `CpuBackend`.

use log::debug;
use rand::rngs::StdRng;
use rk_tensor::{ComputeBackend, CpuBackend, Dense2D, Shape, TensorError};

use crate::error::{ConformanceError, Result};
use crate::random::random_buffer;
use crate::tolerance::Tolerance;

/// Sentinel written into outputs before a call that is expected to fail.
const UNTOUCHED: f32 = 7.25;

/// Left in every output cell before a call that is expected to succeed. A
/// backend that adds into its output, or skips a cell, keeps some of it.
const STALE: f32 = -512.5;

/// Everything a check needs besides its own RNG.
pub struct CheckContext<'a> {
    pub backend: &'a dyn ComputeBackend,
    pub tolerance: Tolerance,
    pub sizes: &'a [usize],
}

pub type CheckFn = fn(&CheckContext<'_>, &mut StdRng) -> Result<()>;

/// Every check, in the order they are run.
pub const ALL_CHECKS: &[(&str, CheckFn)] = &[
    ("matmul_known_case", matmul_known_case),
    ("matmul_identity", matmul_identity),
    ("matmul_zero", matmul_zero),
    ("matmul_matches_reference", matmul_matches_reference),
    ("matmul_deterministic", matmul_deterministic),
    ("matmul_rejects_mismatch", matmul_rejects_mismatch),
    ("conv2d_known_case", conv2d_known_case),
    ("conv2d_zero_kernel", conv2d_zero_kernel),
    ("conv2d_full_overlap", conv2d_full_overlap),
    ("conv2d_output_shapes", conv2d_output_shapes),
    ("conv2d_matches_reference", conv2d_matches_reference),
    ("conv2d_deterministic", conv2d_deterministic),
    ("conv2d_rejects_oversized_kernel", conv2d_rejects_oversized_kernel),
];

fn run_matmul(backend: &dyn ComputeBackend, a: &Dense2D, b: &Dense2D) -> Result<Dense2D> {
    let mut c = Dense2D::full(Shape::matmul_output(a.shape(), b.shape())?, STALE);
    a.matmul_into(b, &mut c, backend)?;
    Ok(c)
}

fn run_conv2d(backend: &dyn ComputeBackend, input: &Dense2D, kernel: &Dense2D) -> Result<Dense2D> {
    let out_shape = Shape::valid_conv_output(input.shape(), kernel.shape())?;
    let mut out = Dense2D::full(out_shape, STALE);
    input.conv2d_into(kernel, &mut out, backend)?;
    Ok(out)
}

fn all_zero(t: &Dense2D) -> Result<()> {
    let cols = t.shape().cols();
    match t.data().iter().position(|&v| v != 0.0) {
        None => Ok(()),
        Some(i) => Err(ConformanceError::ValueMismatch {
            row: i / cols,
            col: i % cols,
            expected: 0.0,
            got: t.data()[i],
        }),
    }
}

fn bitwise_equal(first: &Dense2D, second: &Dense2D) -> Result<()> {
    for (index, (&x, &y)) in first.data().iter().zip(second.data()).enumerate() {
        if x.to_bits() != y.to_bits() {
            return Err(ConformanceError::Nondeterministic {
                index,
                first: x,
                second: y,
            });
        }
    }
    Ok(())
}

/// Calls `f` with an output slice pre-filled with a sentinel and requires it
/// to fail with an error accepted by `expected`, leaving the slice untouched.
fn expect_rejection<F, P>(label: &str, out_len: usize, f: F, expected: P) -> Result<()>
where
    F: FnOnce(&mut [f32]) -> rk_tensor::Result<()>,
    P: Fn(&TensorError) -> bool,
{
    let mut out = vec![UNTOUCHED; out_len];
    match f(&mut out) {
        Ok(()) => Err(ConformanceError::NotRejected(label.to_string())),
        Err(e) if !expected(&e) => Err(ConformanceError::WrongError {
            expected: label.to_string(),
            got: e,
        }),
        Err(_) if out.iter().any(|&v| v.to_bits() != UNTOUCHED.to_bits()) => {
            Err(ConformanceError::OutputTouched)
        }
        Err(_) => Ok(()),
    }
}

fn matmul_known_case(ctx: &CheckContext<'_>, _rng: &mut StdRng) -> Result<()> {
    let a = Dense2D::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]])?;
    let b = Dense2D::from_rows(&[vec![5.0, 6.0], vec![7.0, 8.0]])?;
    let expected = Dense2D::from_rows(&[vec![19.0, 22.0], vec![43.0, 50.0]])?;
    ctx.tolerance.compare(&expected, &run_matmul(ctx.backend, &a, &b)?)
}

fn matmul_identity(ctx: &CheckContext<'_>, rng: &mut StdRng) -> Result<()> {
    for &n in ctx.sizes {
        let a = random_buffer(Shape::square(n), rng);
        let eye = Dense2D::identity(n);
        ctx.tolerance.compare(&a, &run_matmul(ctx.backend, &a, &eye)?)?;
        ctx.tolerance.compare(&a, &run_matmul(ctx.backend, &eye, &a)?)?;
    }
    Ok(())
}

fn matmul_zero(ctx: &CheckContext<'_>, rng: &mut StdRng) -> Result<()> {
    for &n in ctx.sizes {
        let a = random_buffer(Shape::square(n), rng);
        let zero = Dense2D::zeros(Shape::square(n));
        all_zero(&run_matmul(ctx.backend, &a, &zero)?)?;
        all_zero(&run_matmul(ctx.backend, &zero, &a)?)?;
    }
    Ok(())
}

fn matmul_matches_reference(ctx: &CheckContext<'_>, rng: &mut StdRng) -> Result<()> {
    let reference = CpuBackend::new();
    for &n in ctx.sizes {
        let a = random_buffer(Shape::square(n), rng);
        let b = random_buffer(Shape::square(n), rng);
        let expected = run_matmul(&reference, &a, &b)?;
        ctx.tolerance
            .compare(&expected, &run_matmul(ctx.backend, &a, &b)?)?;
        debug!("matmul n={} matches reference", n);
    }
    // One non-square case so backends cannot lean on m == k == n.
    let a = random_buffer(Shape::new(3, 5), rng);
    let b = random_buffer(Shape::new(5, 2), rng);
    let expected = run_matmul(&reference, &a, &b)?;
    ctx.tolerance
        .compare(&expected, &run_matmul(ctx.backend, &a, &b)?)
}

fn matmul_deterministic(ctx: &CheckContext<'_>, rng: &mut StdRng) -> Result<()> {
    for &n in ctx.sizes {
        let a = random_buffer(Shape::square(n), rng);
        let b = random_buffer(Shape::square(n), rng);
        let first = run_matmul(ctx.backend, &a, &b)?;
        let second = run_matmul(ctx.backend, &a, &b)?;
        bitwise_equal(&first, &second)?;
    }
    Ok(())
}

fn matmul_rejects_mismatch(ctx: &CheckContext<'_>, _rng: &mut StdRng) -> Result<()> {
    let a = Dense2D::ones(Shape::new(2, 3));
    let b = Dense2D::ones(Shape::new(2, 2));
    expect_rejection(
        "ShapeMismatch",
        4,
        |out| ctx.backend.matmul(a.data(), a.shape(), b.data(), b.shape(), out),
        |e| matches!(e, TensorError::ShapeMismatch { .. }),
    )
}

fn conv2d_known_case(ctx: &CheckContext<'_>, _rng: &mut StdRng) -> Result<()> {
    let input = Dense2D::ones(Shape::square(3));
    let kernel = Dense2D::ones(Shape::square(2));
    let expected = Dense2D::full(Shape::square(2), 4.0);
    ctx.tolerance
        .compare(&expected, &run_conv2d(ctx.backend, &input, &kernel)?)
}

fn conv2d_zero_kernel(ctx: &CheckContext<'_>, rng: &mut StdRng) -> Result<()> {
    for &n in ctx.sizes.iter().filter(|&&n| n > 0) {
        let input = random_buffer(Shape::square(n), rng);
        let k = n.div_ceil(2);
        let kernel = Dense2D::zeros(Shape::square(k));
        all_zero(&run_conv2d(ctx.backend, &input, &kernel)?)?;
    }
    Ok(())
}

fn conv2d_full_overlap(ctx: &CheckContext<'_>, rng: &mut StdRng) -> Result<()> {
    for &n in ctx.sizes.iter().filter(|&&n| n > 0) {
        let input = random_buffer(Shape::square(n), rng);
        let kernel = random_buffer(Shape::square(n), rng);
        let mut dot = 0.0f32;
        for (x, k) in input.data().iter().zip(kernel.data()) {
            dot += x * k;
        }
        let expected = Dense2D::full(Shape::square(1), dot);
        ctx.tolerance
            .compare(&expected, &run_conv2d(ctx.backend, &input, &kernel)?)?;
    }
    Ok(())
}

fn conv2d_output_shapes(ctx: &CheckContext<'_>, _rng: &mut StdRng) -> Result<()> {
    for &n in ctx.sizes.iter().filter(|&&n| n > 0) {
        for k in [1, n.div_ceil(2), n] {
            let input = Dense2D::ones(Shape::square(n));
            let kernel = Dense2D::ones(Shape::square(k));
            let out_n = n - k + 1;
            let mut out = vec![0.0; out_n * out_n];
            ctx.backend
                .conv2d(input.data(), input.shape(), kernel.data(), kernel.shape(), &mut out)?;

            // An output one cell too large must be refused.
            expect_rejection(
                "LengthMismatch",
                out_n * out_n + 1,
                |out| {
                    ctx.backend
                        .conv2d(input.data(), input.shape(), kernel.data(), kernel.shape(), out)
                },
                |e| matches!(e, TensorError::LengthMismatch { .. }),
            )?;
        }
    }
    Ok(())
}

fn conv2d_matches_reference(ctx: &CheckContext<'_>, rng: &mut StdRng) -> Result<()> {
    let reference = CpuBackend::new();
    for &n in ctx.sizes.iter().filter(|&&n| n > 0) {
        for k in [1, n.div_ceil(2), n] {
            let input = random_buffer(Shape::square(n), rng);
            let kernel = random_buffer(Shape::square(k), rng);
            let expected = run_conv2d(&reference, &input, &kernel)?;
            ctx.tolerance
                .compare(&expected, &run_conv2d(ctx.backend, &input, &kernel)?)?;
        }
        debug!("conv2d n={} matches reference", n);
    }
    // Asymmetric kernel on a rectangular input catches flipped kernels and
    // transposed indexing.
    let input = random_buffer(Shape::new(6, 9), rng);
    let kernel = random_buffer(Shape::new(2, 4), rng);
    let expected = run_conv2d(&reference, &input, &kernel)?;
    ctx.tolerance
        .compare(&expected, &run_conv2d(ctx.backend, &input, &kernel)?)
}

fn conv2d_deterministic(ctx: &CheckContext<'_>, rng: &mut StdRng) -> Result<()> {
    for &n in ctx.sizes.iter().filter(|&&n| n > 0) {
        let input = random_buffer(Shape::square(n), rng);
        let kernel = random_buffer(Shape::square(n.div_ceil(2)), rng);
        let first = run_conv2d(ctx.backend, &input, &kernel)?;
        let second = run_conv2d(ctx.backend, &input, &kernel)?;
        bitwise_equal(&first, &second)?;
    }
    Ok(())
}

fn conv2d_rejects_oversized_kernel(ctx: &CheckContext<'_>, _rng: &mut StdRng) -> Result<()> {
    let input = Dense2D::ones(Shape::square(3));
    for kernel_shape in [Shape::square(4), Shape::new(2, 4), Shape::new(4, 1)] {
        let kernel = Dense2D::ones(kernel_shape);
        expect_rejection(
            "InvalidKernelSize",
            1,
            |out| {
                ctx.backend
                    .conv2d(input.data(), input.shape(), kernel.data(), kernel.shape(), out)
            },
            |e| matches!(e, TensorError::InvalidKernelSize { .. }),
        )?;
    }
    Ok(())
}
