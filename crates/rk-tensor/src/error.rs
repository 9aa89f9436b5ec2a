use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TensorError {
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch { expected: [usize; 2], got: [usize; 2] },
    #[error("invalid kernel size: kernel {kernel:?} does not fit input {input:?}")]
    InvalidKernelSize { input: [usize; 2], kernel: [usize; 2] },
    #[error("buffer length {len} does not match shape {shape:?} (numel={numel})")]
    LengthMismatch {
        len: usize,
        shape: [usize; 2],
        numel: usize,
    },
    #[error("shape {shape:?} has more elements than fit in memory")]
    ShapeOverflow { shape: [usize; 2] },
    #[error("unsupported dtype: {0}")]
    UnsupportedDType(String),
}

pub type Result<T> = std::result::Result<T, TensorError>;
