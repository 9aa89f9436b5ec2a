use rk_tensor::{Shape, TensorError};

/// Status codes returned by all FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RKStatus {
    Ok = 0,
    ErrorInvalidArgument = 1,
    ErrorShapeMismatch = 2,
    ErrorInvalidKernelSize = 3,
    ErrorInternal = 4,
}

impl From<&TensorError> for RKStatus {
    fn from(e: &TensorError) -> Self {
        match e {
            TensorError::ShapeMismatch { .. } | TensorError::LengthMismatch { .. } => {
                RKStatus::ErrorShapeMismatch
            }
            TensorError::InvalidKernelSize { .. } => RKStatus::ErrorInvalidKernelSize,
            TensorError::ShapeOverflow { .. } | TensorError::UnsupportedDType(_) => {
                RKStatus::ErrorInvalidArgument
            }
        }
    }
}

/// A read-only, row-major `rows x cols` buffer of `float`s owned by the caller.
///
/// `data` may be null when `rows * cols == 0`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RKBufferView {
    pub data: *const f32,
    pub rows: usize,
    pub cols: usize,
}

/// A writable, row-major `rows x cols` buffer of `float`s owned by the caller.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RKBufferViewMut {
    pub data: *mut f32,
    pub rows: usize,
    pub cols: usize,
}

/// Element count of a `rows x cols` float buffer, or `None` when its byte
/// size would exceed `isize::MAX` (the limit for any Rust slice).
pub fn checked_len(shape: Shape) -> Option<usize> {
    shape
        .checked_numel()
        .filter(|&n| n <= isize::MAX as usize / std::mem::size_of::<f32>())
}

impl RKBufferView {
    pub fn shape(&self) -> Shape {
        Shape::new(self.rows, self.cols)
    }

    /// Borrows the caller's memory as a slice. An empty view yields `&[]`
    /// whatever `data` holds.
    ///
    /// # Safety
    /// `rows * cols` must have passed `checked_len`, and a non-empty view's
    /// `data` must be aligned and valid for reads of that many floats for
    /// the lifetime `'a`.
    pub unsafe fn as_slice<'a>(&self) -> &'a [f32] {
        match self.shape().numel() {
            0 => &[],
            len => std::slice::from_raw_parts(self.data, len),
        }
    }
}

impl RKBufferViewMut {
    pub fn shape(&self) -> Shape {
        Shape::new(self.rows, self.cols)
    }

    /// Borrows the caller's memory as a mutable slice. An empty view yields
    /// `&mut []` whatever `data` holds.
    ///
    /// # Safety
    /// `rows * cols` must have passed `checked_len`, and a non-empty view's
    /// `data` must be aligned, valid for writes of that many floats for the
    /// lifetime `'a`, and must not overlap any other view passed to the same
    /// call.
    pub unsafe fn as_mut_slice<'a>(&self) -> &'a mut [f32] {
        match self.shape().numel() {
            0 => &mut [],
            len => std::slice::from_raw_parts_mut(self.data, len),
        }
    }
}
