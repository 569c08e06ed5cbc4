//! # tidings-std
//!
//! Dispatch cores for the Tidings publish/subscribe primitive.
//!
//! This crate provides:
//! - **Message dispatch**: [`Dispatcher`], [`LazyDispatcher`]
//! - **Function dispatch**: [`FuncDispatcher`] with policy-driven aggregation
//! - **Keyed dispatch**: [`KeyedDispatcher`]
//! - **Filters**: ordered chains and the handler wrappers applying them
//! - **Construction**: [`DispatchConfig`], [`DispatcherFactory`], [`Hub`]
//!
//! All delivery is synchronous on the publishing thread. Each publish works
//! on a snapshot of the subscribers, so handlers may subscribe, unsubscribe,
//! publish or dispose from inside a delivery.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use tidings_core;

// Modules
pub mod config;
pub mod dispatcher;
pub mod factory;
pub mod filters;
pub mod func;
pub mod hub;
pub mod keyed;
pub mod lazy;
pub mod snapshot;
pub mod testing;

mod invoke;
mod subscribers;

pub use config::DispatchConfig;
pub use dispatcher::Dispatcher;
pub use factory::DispatcherFactory;
pub use func::{FuncDispatcher, Results, SharedFunc};
pub use hub::Hub;
pub use keyed::KeyedDispatcher;
pub use lazy::LazyDispatcher;
pub use snapshot::{Snapshot, SnapshotPool};
