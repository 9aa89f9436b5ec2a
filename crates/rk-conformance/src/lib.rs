//! `rk-conformance` - Checks a `ComputeBackend` against the reference kernels.
//!
//! Any optimized replacement for `CpuBackend` (tiled, vectorized, offloaded)
//! can be run through [`ConformanceSuite`] to confirm it keeps the identity,
//! zero, known-value, shape, determinism and error-handling properties, and
//! that it agrees with the reference on seeded random operands.

pub mod checks;
pub mod error;
pub mod random;
pub mod suite;
pub mod tolerance;

pub use error::{ConformanceError, Result};
pub use random::random_buffer;
pub use suite::{CheckOutcome, ConformanceSuite, Report};
pub use tolerance::Tolerance;
