use std::fmt;
use std::str::FromStr;

use crate::error::TensorError;

/// Element precisions a buffer can be stored or exchanged in.
///
/// Kernels always accumulate in `F32`; `F16` exists so callers holding
/// half-precision data can widen it on the way in and narrow results on the
/// way out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// 32-bit floating point.
    F32,
    /// 16-bit floating point (IEEE 754 half-precision, via the `half` crate).
    F16,
}

impl DType {
    /// Returns the size in bytes of a single element.
    pub fn size_in_bytes(&self) -> usize {
        match self {
            DType::F32 => 4,
            DType::F16 => 2,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::F32 => write!(f, "float32"),
            DType::F16 => write!(f, "float16"),
        }
    }
}

impl FromStr for DType {
    type Err = TensorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "f32" | "float32" => Ok(DType::F32),
            "f16" | "float16" | "half" => Ok(DType::F16),
            other => Err(TensorError::UnsupportedDType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_in_bytes() {
        assert_eq!(DType::F32.size_in_bytes(), 4);
        assert_eq!(DType::F16.size_in_bytes(), 2);
    }

    #[test]
    fn test_parse() {
        assert_eq!("f32".parse::<DType>().unwrap(), DType::F32);
        assert_eq!("Float16".parse::<DType>().unwrap(), DType::F16);
        assert!(matches!(
            "bf16".parse::<DType>(),
            Err(TensorError::UnsupportedDType(_))
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(DType::F32.to_string(), "float32");
        assert_eq!(DType::F16.to_string(), "float16");
    }
}
