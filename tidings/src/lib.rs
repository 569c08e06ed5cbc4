//! # tidings - Typed In-Process Publish/Subscribe
//!
//! `tidings` delivers typed messages to registered handlers, synchronously
//! and in subscription order. It comes in two variants:
//!
//! - **Message dispatch**: handlers receive a message and return nothing but
//!   an optional error, which goes to the handler's own error channel.
//! - **Function dispatch**: handlers return a [`FuncResult`], and a publish
//!   reduces the results under an [`Aggregation`] policy.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tidings::prelude::*;
//!
//! #[derive(Clone, Debug)]
//! struct Tick(u64);
//!
//! let factory = DispatcherFactory::default();
//! let ticks = factory.create::<Tick>();
//!
//! let token = ticks.subscribe(|t: &Tick| println!("tick {}", t.0));
//! ticks.publish(&Tick(1));
//! token.dispose();
//! ```
//!
//! ## Filters
//!
//! Filters are attached at subscribe time and run in ascending
//! [`Filter::order`]. A blocking filter skips the handler silently:
//!
//! ```rust,ignore
//! ticks.subscribe_filtered(
//!     Arc::new(|t: &Tick| println!("even {}", t.0)),
//!     vec![Arc::new(filter_fn(0, |t: &Tick| Flow::from(t.0 % 2 == 0)))],
//! );
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use tidings_core::{
    // Results
    Aggregation,
    // Errors
    BoxError,
    // Subscriptions
    CompositeSubscription,
    // Seams
    Dispose,
    Error,
    // Filters
    Filter,
    FilterFn,
    Flow,
    // Handlers
    FnHandler,
    FuncHandler,
    FuncResult,
    Handler,
    HandlerError,
    Inspect,
    IntoFuncResult,
    IntoOutcome,
    LifecycleError,
    // Message
    Message,
    MutatingFilter,
    Publish,
    PublishFlags,
    Result,
    Subscribe,
    Subscription,
    filter_fn,
    mutate_fn,
};

pub use tidings_std::{
    DispatchConfig, Dispatcher, DispatcherFactory, FuncDispatcher, Hub, KeyedDispatcher,
    LazyDispatcher, Results, SharedFunc, Snapshot,
};

/// Filter composition and handler wrappers.
pub mod filters {
    pub use tidings_std::filters::{
        FilterChain, Filtered, FilteredFunc, Lifted, Mutated, MutatingChain, compose,
        compose_mutating, filtered, filtered_func, lift, mutated,
    };
}

/// Testing utilities.
pub mod testing {
    pub use tidings_std::testing::{ConstFunc, CountingHandler, RecordingHandler};
}

/// Prelude module - common imports for Tidings.
///
/// # Usage
///
/// ```rust,ignore
/// use tidings::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Aggregation, BoxError, DispatchConfig, Dispatcher, DispatcherFactory, Dispose, Filter,
        Flow, FuncDispatcher, FuncHandler, FuncResult, Handler, Message, MutatingFilter, Publish,
        PublishFlags, Subscribe, Subscription, filter_fn, mutate_fn,
    };
    pub use std::sync::Arc;
}
