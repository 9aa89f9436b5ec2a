//! `rk-tensor` - Dense 2D buffers and the reference numeric kernels for reference-kernels.
//!
//! This crate provides:
//! - A `Dense2D` row-major `f32` buffer carrying its own `Shape`
//! - A `ComputeBackend` trait for pluggable kernel implementations
//! - The reference `CpuBackend` (direct matmul and valid-mode conv2d)
//! - `ops` entry points that validate shapes before computing
//! - Data type definitions (F32 compute, F16 interchange)

pub mod backend;
pub mod cpu;
pub mod dense;
pub mod dtype;
pub mod error;
pub mod ops;
pub mod shape;

// Re-export primary types at the crate root for convenience.
pub use backend::ComputeBackend;
pub use cpu::CpuBackend;
pub use dense::Dense2D;
pub use dtype::DType;
pub use error::{Result, TensorError};
pub use ops::{conv2d, conv2d_into, matmul, matmul_into};
pub use shape::Shape;
