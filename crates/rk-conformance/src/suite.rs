use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rk_tensor::ComputeBackend;

use crate::checks::{CheckContext, ALL_CHECKS};
use crate::error::Result;
use crate::tolerance::Tolerance;

/// The result of one named check.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub result: Result<()>,
}

impl CheckOutcome {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcome of a full suite run against one backend.
#[derive(Debug, Clone)]
pub struct Report {
    pub backend: String,
    pub outcomes: Vec<CheckOutcome>,
}

impl Report {
    /// True if every check passed.
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(CheckOutcome::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|o| !o.passed())
    }

    /// Looks up a check by name.
    pub fn outcome(&self, name: &str) -> Option<&CheckOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }
}

/// Runs every property check against a `ComputeBackend`.
///
/// Random operands come from a `StdRng` reseeded per check, so a failing
/// check reproduces on its own regardless of which others ran before it.
#[derive(Debug, Clone)]
pub struct ConformanceSuite {
    tolerance: Tolerance,
    seed: u64,
    sizes: Vec<usize>,
}

impl ConformanceSuite {
    pub const DEFAULT_SEED: u64 = 0x5eed_2d2d;

    pub fn new(tolerance: Tolerance) -> Self {
        Self {
            tolerance,
            seed: Self::DEFAULT_SEED,
            sizes: vec![1, 2, 3, 8, 17, 32],
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Square extents the size-parameterised checks sweep over.
    pub fn with_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.sizes = sizes;
        self
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    pub fn run(&self, backend: &dyn ComputeBackend) -> Report {
        let ctx = CheckContext {
            backend,
            tolerance: self.tolerance,
            sizes: &self.sizes,
        };

        let mut outcomes = Vec::with_capacity(ALL_CHECKS.len());
        for (i, &(name, check)) in ALL_CHECKS.iter().enumerate() {
            let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(i as u64));
            let result = check(&ctx, &mut rng);
            match &result {
                Ok(()) => info!("[{}] {} ok", backend.name(), name),
                Err(e) => warn!("[{}] {} FAILED: {}", backend.name(), name, e),
            }
            outcomes.push(CheckOutcome { name, result });
        }

        Report {
            backend: backend.name().to_string(),
            outcomes,
        }
    }
}

impl Default for ConformanceSuite {
    fn default() -> Self {
        Self::new(Tolerance::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConformanceError;
    use rk_tensor::{CpuBackend, Shape, TensorError};

    /// Applies the kernel flipped in both axes: true convolution instead of
    /// cross-correlation.
    #[derive(Debug)]
    struct FlippedConv;

    impl ComputeBackend for FlippedConv {
        fn name(&self) -> &str {
            "flipped"
        }

        fn matmul(
            &self,
            a: &[f32],
            a_shape: Shape,
            b: &[f32],
            b_shape: Shape,
            c: &mut [f32],
        ) -> rk_tensor::Result<()> {
            CpuBackend::new().matmul(a, a_shape, b, b_shape, c)
        }

        fn conv2d(
            &self,
            input: &[f32],
            input_shape: Shape,
            kernel: &[f32],
            kernel_shape: Shape,
            output: &mut [f32],
        ) -> rk_tensor::Result<()> {
            let flipped: Vec<f32> = kernel.iter().rev().copied().collect();
            CpuBackend::new().conv2d(input, input_shape, &flipped, kernel_shape, output)
        }
    }

    /// Sums the inner product from `k - 1` down to 0, and skips shape checks.
    #[derive(Debug)]
    struct ReversedMatmul;

    impl ComputeBackend for ReversedMatmul {
        fn name(&self) -> &str {
            "reversed"
        }

        fn matmul(
            &self,
            a: &[f32],
            a_shape: Shape,
            b: &[f32],
            b_shape: Shape,
            c: &mut [f32],
        ) -> rk_tensor::Result<()> {
            let (m, k, n) = (a_shape.rows(), a_shape.cols(), b_shape.cols());
            for i in 0..m {
                for j in 0..n {
                    let mut sum = 0.0f32;
                    for p in (0..k).rev() {
                        sum += a.get(i * k + p).copied().unwrap_or(0.0)
                            * b.get(p * n + j).copied().unwrap_or(0.0);
                    }
                    if let Some(cell) = c.get_mut(i * n + j) {
                        *cell = sum;
                    }
                }
            }
            Ok(())
        }

        fn conv2d(
            &self,
            input: &[f32],
            input_shape: Shape,
            kernel: &[f32],
            kernel_shape: Shape,
            output: &mut [f32],
        ) -> rk_tensor::Result<()> {
            CpuBackend::new().conv2d(input, input_shape, kernel, kernel_shape, output)
        }
    }

    /// Adds each result into the output instead of overwriting it.
    #[derive(Debug)]
    struct Accumulating;

    fn add_into(out: &mut [f32], fresh: Vec<f32>) {
        for (cell, v) in out.iter_mut().zip(fresh) {
            *cell += v;
        }
    }

    impl ComputeBackend for Accumulating {
        fn name(&self) -> &str {
            "accumulating"
        }

        fn matmul(
            &self,
            a: &[f32],
            a_shape: Shape,
            b: &[f32],
            b_shape: Shape,
            c: &mut [f32],
        ) -> rk_tensor::Result<()> {
            let mut fresh = vec![0.0; c.len()];
            CpuBackend::new().matmul(a, a_shape, b, b_shape, &mut fresh)?;
            add_into(c, fresh);
            Ok(())
        }

        fn conv2d(
            &self,
            input: &[f32],
            input_shape: Shape,
            kernel: &[f32],
            kernel_shape: Shape,
            output: &mut [f32],
        ) -> rk_tensor::Result<()> {
            let mut fresh = vec![0.0; output.len()];
            CpuBackend::new().conv2d(input, input_shape, kernel, kernel_shape, &mut fresh)?;
            add_into(output, fresh);
            Ok(())
        }
    }

    #[test]
    fn test_reference_passes_bit_exact() {
        let report = ConformanceSuite::default().run(&CpuBackend::new());
        assert_eq!(report.backend, "cpu");
        assert_eq!(report.outcomes.len(), ALL_CHECKS.len());
        for outcome in &report.outcomes {
            assert!(outcome.passed(), "{}: {:?}", outcome.name, outcome.result);
        }
        assert!(report.passed());
    }

    #[test]
    fn test_flipped_kernel_is_caught() {
        let report = ConformanceSuite::default().run(&FlippedConv);
        assert!(!report.passed());
        let outcome = report.outcome("conv2d_matches_reference").unwrap();
        assert!(matches!(
            outcome.result,
            Err(ConformanceError::ValueMismatch { .. })
        ));
        // A symmetric all-ones kernel cannot tell the two conventions apart.
        assert!(report.outcome("conv2d_known_case").unwrap().passed());
        assert!(report.outcome("matmul_known_case").unwrap().passed());
    }

    #[test]
    fn test_reordered_matmul_fails_bit_exact_passes_relaxed() {
        let strict = ConformanceSuite::default().run(&ReversedMatmul);
        assert!(!strict
            .outcome("matmul_matches_reference")
            .unwrap()
            .passed());

        let relaxed = ConformanceSuite::new(Tolerance::relaxed()).run(&ReversedMatmul);
        assert!(relaxed
            .outcome("matmul_matches_reference")
            .unwrap()
            .passed());
        // The missing validation is still caught.
        assert!(matches!(
            relaxed.outcome("matmul_rejects_mismatch").unwrap().result,
            Err(ConformanceError::NotRejected(_))
        ));
    }

    #[test]
    fn test_accumulating_backend_is_caught() {
        for tolerance in [Tolerance::BitExact, Tolerance::relaxed()] {
            let report = ConformanceSuite::new(tolerance).run(&Accumulating);
            assert!(!report.passed());
            for name in ["matmul_known_case", "matmul_zero", "conv2d_known_case"] {
                assert!(matches!(
                    report.outcome(name).unwrap().result,
                    Err(ConformanceError::ValueMismatch { .. })
                ));
            }
            // Validation happens before the add, so rejections still hold.
            assert!(report.outcome("matmul_rejects_mismatch").unwrap().passed());
        }
    }

    #[test]
    fn test_seed_changes_nothing_for_reference() {
        let report = ConformanceSuite::default()
            .with_seed(42)
            .with_sizes(vec![4, 5])
            .run(&CpuBackend::new());
        assert!(report.passed());
        assert_eq!(report.failures().count(), 0);
    }

    #[test]
    fn test_kernel_error_converts() {
        let err: ConformanceError = TensorError::UnsupportedDType("x".into()).into();
        assert!(matches!(err, ConformanceError::Kernel(_)));
    }
}
