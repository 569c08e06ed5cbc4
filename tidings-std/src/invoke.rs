//! Isolated handler invocation.

use std::panic::{AssertUnwindSafe, catch_unwind};
use tidings_core::{BoxError, HandlerError};

/// Runs one handler invocation, turning a panic into a [`HandlerError`] when
/// `catch_panics` is set.
///
/// No dispatcher lock is held while `f` runs, so unwinding cannot leave the
/// subscriber set in a torn state.
pub(crate) fn guarded<T>(
    catch_panics: bool,
    f: impl FnOnce() -> Result<T, BoxError>,
) -> Result<T, BoxError> {
    if !catch_panics {
        return f();
    }
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(Box::new(HandlerError::from_panic(payload))),
    }
}

/// Runs a handler notification (`on_error` or `on_completed`).
///
/// With `catch_panics` set, a panicking notification is logged and dropped,
/// so the caller's loop over the remaining handlers always finishes.
pub(crate) fn notify(catch_panics: bool, callback: &'static str, f: impl FnOnce()) {
    if !catch_panics {
        f();
        return;
    }
    if let Err(payload) = catch_unwind(AssertUnwindSafe(f)) {
        let error = HandlerError::from_panic(payload);
        tracing::warn!(callback, %error, "handler notification panicked");
    }
}
