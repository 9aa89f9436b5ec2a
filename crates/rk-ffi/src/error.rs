use std::cell::RefCell;
use std::ffi::CString;

use rk_tensor::TensorError;

use crate::types::RKStatus;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Store an error message for later retrieval via `rk_last_error`.
pub fn set_last_error(msg: String) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Take the last error message, leaving `None` in its place.
pub fn take_last_error() -> Option<CString> {
    LAST_ERROR.with(|e| e.borrow_mut().take())
}

/// Records a kernel error as the thread's last error and maps it to a status.
pub fn record(op: &str, err: &TensorError) -> RKStatus {
    set_last_error(format!("{}: {}", op, err));
    RKStatus::from(err)
}
