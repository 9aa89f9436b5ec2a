use anyhow::{Context, Result};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rk_conformance::random_buffer;
use rk_tensor::{conv2d_into, matmul_into, Dense2D, Shape};
use serde::Serialize;

use crate::config::{Fill, Operation, RunConfig};
use crate::host::HostProfile;
use crate::timing::time_cpu;

/// Summary of one timed kernel run.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub operation_type: String,
    pub n: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k: Option<usize>,
    /// `log10(work + 1)`, rounded to 4 decimals.
    pub log_size: f64,
    pub dtype: String,
    pub fill: String,
    pub cpu_runtime_ms: f64,
    pub reps: usize,
    pub input_bytes: usize,
    pub output_rows: usize,
    pub output_cols: usize,
    /// Value of the output's top-left cell.
    pub first_value: f32,
    #[serde(flatten)]
    pub host: HostProfile,
}

pub fn log_size(work: u128) -> f64 {
    ((work as f64 + 1.0).log10() * 1e4).round() / 1e4
}

fn make_buffer(shape: Shape, fill: Fill, rng: &mut StdRng) -> Dense2D {
    match fill {
        Fill::Zeros => Dense2D::zeros(shape),
        Fill::Ones => Dense2D::ones(shape),
        Fill::Pattern => Dense2D::from_fn(shape, |r, c| ((r * 31 + c * 17) % 13) as f32 / 13.0),
        Fill::Random => random_buffer(shape, rng),
    }
}

/// Allocates and fills the operands, runs the selected kernel under the
/// timer, and returns the run record.
pub fn run(config: &RunConfig) -> Result<RunRecord> {
    let host = HostProfile::collect();
    debug!(
        "host {} ({} MB, {} cpus, load {:.1}%)",
        host.device_name, host.mem_total_mb, host.cpu_count, host.cpu_load_pct
    );
    let mut rng = StdRng::seed_from_u64(config.seed);

    let (lhs_shape, rhs_shape, out_shape) = match config.op {
        Operation::Matmul { n } => (Shape::square(n), Shape::square(n), Shape::square(n)),
        Operation::Conv2d { n, k } => {
            let out = Shape::valid_conv_output(Shape::square(n), Shape::square(k))
                .context("conv2d operands")?;
            (Shape::square(n), Shape::square(k), out)
        }
    };

    let lhs = make_buffer(lhs_shape, config.fill, &mut rng).round_to(config.dtype);
    let rhs = make_buffer(rhs_shape, config.fill, &mut rng).round_to(config.dtype);
    let mut out = Dense2D::zeros(out_shape);
    debug!(
        "{}: operands {} and {}, output {}, dtype {}",
        config.op.name(),
        lhs_shape,
        rhs_shape,
        out_shape,
        config.dtype
    );

    let timing = match config.op {
        Operation::Matmul { .. } => time_cpu(
            || matmul_into(&lhs, &rhs, &mut out).context("matmul"),
            config.warmup,
            config.reps,
        )?,
        Operation::Conv2d { .. } => time_cpu(
            || conv2d_into(&lhs, &rhs, &mut out).context("conv2d"),
            config.warmup,
            config.reps,
        )?,
    };
    let cpu_runtime_ms = timing.median_ms();
    info!(
        "{} median {:.3} ms over {} reps",
        config.op.name(),
        cpu_runtime_ms,
        config.reps
    );

    let k = match config.op {
        Operation::Matmul { .. } => None,
        Operation::Conv2d { k, .. } => Some(k),
    };
    Ok(RunRecord {
        operation_type: config.op.name().to_string(),
        n: lhs_shape.rows(),
        k,
        log_size: log_size(config.op.work()),
        dtype: config.dtype.to_string(),
        fill: config.fill.to_string(),
        cpu_runtime_ms: (cpu_runtime_ms * 1e4).round() / 1e4,
        reps: config.reps,
        input_bytes: lhs.nbytes(config.dtype) + rhs.nbytes(config.dtype),
        output_rows: out_shape.rows(),
        output_cols: out_shape.cols(),
        first_value: out.get(0, 0).unwrap_or(0.0),
        host,
    })
}
