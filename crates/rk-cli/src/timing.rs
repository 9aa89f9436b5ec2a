use std::time::Instant;

use anyhow::Result;

/// Wall-clock samples from repeated runs of one closure.
#[derive(Debug, Clone)]
pub struct Timing {
    pub samples_ms: Vec<f64>,
}

impl Timing {
    /// Median of the samples; the mean of the two middle samples when the
    /// count is even. `0.0` if there are no samples.
    pub fn median_ms(&self) -> f64 {
        let mut sorted = self.samples_ms.clone();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len();
        match n {
            0 => 0.0,
            _ if n % 2 == 1 => sorted[n / 2],
            _ => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
        }
    }
}

/// Runs `f` `warmup` times untimed, then `reps` times timed.
///
/// The first error from `f` aborts timing and is returned.
pub fn time_cpu<F>(mut f: F, warmup: usize, reps: usize) -> Result<Timing>
where
    F: FnMut() -> Result<()>,
{
    for _ in 0..warmup {
        f()?;
    }
    let mut samples_ms = Vec::with_capacity(reps);
    for _ in 0..reps {
        let start = Instant::now();
        f()?;
        samples_ms.push(start.elapsed().as_secs_f64() * 1000.0);
    }
    Ok(Timing { samples_ms })
}
