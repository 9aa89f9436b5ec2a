use rk_tensor::TensorError;
use thiserror::Error;

/// Why a single conformance check failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConformanceError {
    #[error("kernel error: {0}")]
    Kernel(#[from] TensorError),
    #[error("output shape: expected {expected:?}, got {got:?}")]
    OutputShape { expected: [usize; 2], got: [usize; 2] },
    #[error("value mismatch at ({row}, {col}): expected {expected}, got {got}")]
    ValueMismatch {
        row: usize,
        col: usize,
        expected: f32,
        got: f32,
    },
    #[error("repeated call differs at flat index {index}: {first} vs {second}")]
    Nondeterministic { index: usize, first: f32, second: f32 },
    #[error("invalid operands were accepted: {0}")]
    NotRejected(String),
    #[error("invalid operands rejected with the wrong error: expected {expected}, got {got}")]
    WrongError { expected: String, got: TensorError },
    #[error("output was written by a call that failed validation")]
    OutputTouched,
}

pub type Result<T> = std::result::Result<T, ConformanceError>;
