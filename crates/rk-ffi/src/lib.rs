mod error;
mod types;

pub use error::*;
pub use types::*;

use std::ffi::CString;
use std::os::raw::c_char;

use rk_tensor::{ComputeBackend, CpuBackend, Shape};

/// Execute a closure that returns an `RKStatus`, catching any panics
/// and converting them into `RKStatus::ErrorInternal`.
fn catch_panic<F: FnOnce() -> RKStatus + std::panic::UnwindSafe>(f: F) -> RKStatus {
    match std::panic::catch_unwind(f) {
        Ok(status) => status,
        Err(_) => {
            set_last_error("internal panic".to_string());
            RKStatus::ErrorInternal
        }
    }
}

/// Byte range `[start, end)` covered by `numel` floats at `ptr`.
fn byte_range(ptr: usize, numel: usize) -> (usize, usize) {
    (ptr, ptr.saturating_add(numel.saturating_mul(std::mem::size_of::<f32>())))
}

/// True if the output view shares any memory with an input view.
fn overlaps(input: &RKBufferView, output: &RKBufferViewMut) -> bool {
    let (a0, a1) = byte_range(input.data as usize, input.shape().numel());
    let (b0, b1) = byte_range(output.data as usize, output.shape().numel());
    a0 < b1 && b0 < a1
}

/// Rule giving the required output shape of a two-operand kernel.
type OutputRule = fn(Shape, Shape) -> rk_tensor::Result<Shape>;

/// Checks extents, pointers and the output shape of a two-operand call
/// before any slice is formed. Nothing is written on failure.
fn check_views(
    op: &str,
    x: &RKBufferView,
    y: &RKBufferView,
    out: &RKBufferViewMut,
    output_rule: OutputRule,
) -> RKStatus {
    let views = [
        (x.shape(), x.data.is_null()),
        (y.shape(), y.data.is_null()),
        (out.shape(), out.data.is_null()),
    ];
    for (shape, is_null) in views {
        match checked_len(shape) {
            None => {
                set_last_error(format!("{}: extents {} overflow", op, shape));
                return RKStatus::ErrorInvalidArgument;
            }
            Some(len) if len > 0 && is_null => {
                set_last_error(format!("{}: null buffer", op));
                return RKStatus::ErrorInvalidArgument;
            }
            Some(_) => {}
        }
    }

    let expected = match output_rule(x.shape(), y.shape()) {
        Ok(shape) => shape,
        Err(e) => return record(op, &e),
    };
    if let Err(e) = out.shape().expect(expected) {
        return record(op, &e);
    }

    if overlaps(x, out) || overlaps(y, out) {
        set_last_error(format!("{}: output buffer overlaps an operand", op));
        return RKStatus::ErrorInvalidArgument;
    }
    RKStatus::Ok
}

/// Matrix multiplication `c = a @ b` into caller-owned memory.
///
/// `a` is `m x k`, `b` is `k x n`, `c` must be declared `m x n`. Shapes are
/// validated before anything is written; on error `c` is left untouched and
/// the message is available from `rk_last_error`.
///
/// # Safety
/// Each non-empty view's `data` must be valid for `rows * cols` floats.
/// Empty views may pass a null `data`.
#[no_mangle]
pub unsafe extern "C" fn rk_matmul(a: RKBufferView, b: RKBufferView, c: RKBufferViewMut) -> RKStatus {
    catch_panic(|| {
        let status = check_views("matmul", &a, &b, &c, Shape::matmul_output);
        if status != RKStatus::Ok {
            return status;
        }
        let backend = CpuBackend::new();
        let result = unsafe {
            backend.matmul(a.as_slice(), a.shape(), b.as_slice(), b.shape(), c.as_mut_slice())
        };
        match result {
            Ok(()) => RKStatus::Ok,
            Err(e) => record("matmul", &e),
        }
    })
}

/// Valid-mode 2D cross-correlation of `input` with `kernel` into `output`.
///
/// `output` must be declared `(H - KH + 1) x (W - KW + 1)`. A kernel larger
/// than the input in either dimension yields `ErrorInvalidKernelSize`.
///
/// # Safety
/// Same requirements as `rk_matmul`.
#[no_mangle]
pub unsafe extern "C" fn rk_conv2d(
    input: RKBufferView,
    kernel: RKBufferView,
    output: RKBufferViewMut,
) -> RKStatus {
    catch_panic(|| {
        let status = check_views("conv2d", &input, &kernel, &output, Shape::valid_conv_output);
        if status != RKStatus::Ok {
            return status;
        }
        let backend = CpuBackend::new();
        let result = unsafe {
            backend.conv2d(
                input.as_slice(),
                input.shape(),
                kernel.as_slice(),
                kernel.shape(),
                output.as_mut_slice(),
            )
        };
        match result {
            Ok(()) => RKStatus::Ok,
            Err(e) => record("conv2d", &e),
        }
    })
}

/// Retrieve the last error message.
///
/// Returns a pointer to a C string describing the most recent error on this
/// thread, or null if there is none. The caller must free the returned
/// string with `rk_free_string`.
#[no_mangle]
pub extern "C" fn rk_last_error() -> *const c_char {
    match error::take_last_error() {
        Some(e) => e.into_raw(),
        None => std::ptr::null(),
    }
}

/// Free a string previously returned by `rk_last_error`.
///
/// # Safety
/// `s` must be null or a pointer obtained from `rk_last_error`.
#[no_mangle]
pub unsafe extern "C" fn rk_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
