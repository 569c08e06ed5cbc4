//! Testing utilities for Tidings.
//!
//! This module provides handlers that record what a dispatcher did to them,
//! so tests can assert on deliveries, errors and completion.
//!
//! # Features
//!
//! - [`RecordingHandler`]: records messages, errors and completions
//! - [`CountingHandler`]: counts invocations and completions
//! - [`ConstFunc`]: a function handler returning a fixed result

use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use tidings_core::{BoxError, FuncHandler, FuncResult, Handler, Message};

// ============================================================================
// Recording Handler
// ============================================================================

/// A handler that records everything it receives.
///
/// Clones share the same recording, so keep one clone for assertions and
/// subscribe the other.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingHandler::<Tick>::new();
/// dispatcher.subscribe(recorder.clone());
///
/// dispatcher.publish(&Tick(1));
/// dispatcher.dispose();
///
/// assert_eq!(recorder.messages(), vec![Tick(1)]);
/// assert_eq!(recorder.completions(), 1);
/// ```
pub struct RecordingHandler<M> {
    messages: Arc<Mutex<Vec<M>>>,
    errors: Arc<Mutex<Vec<BoxError>>>,
    completions: Arc<AtomicUsize>,
    fail_with: Option<Arc<dyn Fn(&M) -> Option<BoxError> + Send + Sync>>,
}

impl<M: Clone> RecordingHandler<M> {
    /// Create a handler that always succeeds.
    pub fn new() -> Self {
        Self {
            messages: Arc::new(Mutex::new(Vec::new())),
            errors: Arc::new(Mutex::new(Vec::new())),
            completions: Arc::new(AtomicUsize::new(0)),
            fail_with: None,
        }
    }

    /// Create a handler that records the message and then fails with the
    /// error produced by `fail`, if any.
    pub fn failing(fail: impl Fn(&M) -> Option<BoxError> + Send + Sync + 'static) -> Self {
        Self {
            fail_with: Some(Arc::new(fail)),
            ..Self::new()
        }
    }

    /// Get a clone of the recorded messages.
    pub fn messages(&self) -> Vec<M> {
        self.messages.lock().clone()
    }

    /// Get the number of recorded messages.
    pub fn count(&self) -> usize {
        self.messages.lock().len()
    }

    /// Get the number of errors received on the error channel.
    pub fn error_count(&self) -> usize {
        self.errors.lock().len()
    }

    /// Get the display form of every received error.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.lock().iter().map(|e| e.to_string()).collect()
    }

    /// Get the number of completion notifications.
    pub fn completions(&self) -> usize {
        self.completions.load(Ordering::SeqCst)
    }
}

impl<M: Clone> Default for RecordingHandler<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for RecordingHandler<M> {
    fn clone(&self) -> Self {
        Self {
            messages: self.messages.clone(),
            errors: self.errors.clone(),
            completions: self.completions.clone(),
            fail_with: self.fail_with.clone(),
        }
    }
}

impl<M: Message + Clone> Handler<M> for RecordingHandler<M> {
    fn handle(&self, message: &M) -> Result<(), BoxError> {
        self.messages.lock().push(message.clone());
        match self.fail_with.as_ref().and_then(|fail| fail(message)) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn on_error(&self, error: BoxError) {
        self.errors.lock().push(error);
    }

    fn on_completed(&self) {
        self.completions.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Counting Handler
// ============================================================================

/// A handler that counts invocations, for any message type.
#[derive(Clone, Default)]
pub struct CountingHandler {
    calls: Arc<AtomicUsize>,
    completions: Arc<AtomicUsize>,
}

impl CountingHandler {
    /// Create a new counting handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of invocations.
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Get the number of completion notifications.
    pub fn completions(&self) -> usize {
        self.completions.load(Ordering::SeqCst)
    }
}

impl<M: Message> Handler<M> for CountingHandler {
    fn handle(&self, _message: &M) -> Result<(), BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_completed(&self) {
        self.completions.fetch_add(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Const Func
// ============================================================================

/// A function handler that returns a fixed result and counts its calls.
///
/// Useful for checking which handlers an aggregation policy actually ran.
pub struct ConstFunc<R> {
    result: FuncResult<R>,
    calls: Arc<AtomicUsize>,
}

impl<R: Clone> ConstFunc<R> {
    /// A handler returning `Success(value)`.
    pub fn success(value: R) -> Self {
        Self::new(FuncResult::Success(value))
    }

    /// A handler returning `Failure(Some(value))`.
    pub fn failure(value: R) -> Self {
        Self::new(FuncResult::Failure(Some(value)))
    }

    /// A handler returning `result`.
    pub fn new(result: FuncResult<R>) -> Self {
        Self {
            result,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A shared view of the call counter.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl<A: Message, R: Message + Clone> FuncHandler<A, R> for ConstFunc<R> {
    fn call(&self, _arg: &A) -> Result<FuncResult<R>, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.result.clone())
    }
}
