//! # tidings-core
//!
//! Core traits for the Tidings in-process publish/subscribe primitive.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! code that registers handlers or filters without needing the dispatch
//! engines in `tidings-std`.
//!
//! # Capabilities
//!
//! Tidings models every participant as a small, closed capability trait and
//! composes them by explicit wrapping rather than by runtime type checks:
//!
//! - [`Handler`] - receives published messages (message variant)
//! - [`FuncHandler`] - computes a [`FuncResult`] per argument (function variant)
//! - [`Filter`] / [`MutatingFilter`] - ordered gates in front of a handler
//! - [`Subscribe`] / [`Publish`] / [`Dispose`] - the dispatcher seams
//!
//! # Error Types
//!
//! - [`Error`] - returned to the caller of an operation
//! - [`LifecycleError`] - illegal transitions of a deferred dispatcher
//! - [`HandlerError`] - failures synthesized for a handler's error channel

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod dispatcher;
mod error;
mod filter;
mod handler;
mod message;
mod result;
mod subscription;

// Re-exports
pub use dispatcher::{Dispose, Publish, Subscribe};
pub use error::{BoxError, Error, HandlerError, LifecycleError, Result};
pub use filter::{Filter, FilterFn, Flow, Inspect, MutatingFilter, filter_fn, mutate_fn};
pub use handler::{FnHandler, FuncHandler, Handler, IntoFuncResult, IntoOutcome};
pub use message::Message;
pub use result::{Aggregation, FuncResult, PublishFlags};
pub use subscription::{CompositeSubscription, Subscription};
