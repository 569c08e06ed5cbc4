//! Error types for Tidings.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`Error`] - Errors returned to the caller of a dispatch operation
//! - [`LifecycleError`] - Illegal state transitions on a deferred core
//! - [`HandlerError`] - Failures caught while invoking a handler
//!
//! Handler failures never reach the publisher. They are delivered to the
//! failing handler's own error channel instead.

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used by fallible Tidings operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned synchronously to the caller of an operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An argument or configuration value was rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A dispatcher for this message type is already registered.
    #[error("a dispatcher for `{type_name}` is already registered")]
    DuplicateRegistration {
        /// Name of the message type.
        type_name: &'static str,
    },

    /// A strict lookup found no dispatcher.
    #[error("no dispatcher registered for key: {0}")]
    KeyNotFound(String),

    /// An operation was attempted in a state that does not allow it.
    #[error("invalid lifecycle transition: {0}")]
    Lifecycle(#[from] LifecycleError),
}

/// Illegal transitions of a deferred dispatcher.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    /// The dispatcher already allocated its own subscriber set.
    #[error("dispatcher is already materialized")]
    AlreadyMaterialized,

    /// A forwarding target was already set.
    #[error("dispatcher already forwards to a successor")]
    AlreadyLinked,

    /// The dispatcher has been disposed.
    #[error("dispatcher has been disposed")]
    Disposed,
}

/// Failures caught while invoking a handler.
///
/// Ordinary failures reach `on_error` as the handler's own [`BoxError`];
/// this type only describes failures the dispatcher had to synthesize.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler panicked during invocation.
    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl HandlerError {
    /// Builds a [`HandlerError::Panicked`] from a `catch_unwind` payload.
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        HandlerError::Panicked(message)
    }
}
