//! Handler wrappers that apply a filter before forwarding.
//!
//! Dispatch cores only ever see plain handlers; filtering is decided once, at
//! subscribe time, by wrapping.

use super::chain::{compose, compose_mutating};
use std::sync::Arc;
use tidings_core::{BoxError, Filter, FuncHandler, FuncResult, Handler, Message, MutatingFilter};

/// A handler that runs only when its filter passes.
pub struct Filtered<M: Message> {
    filter: Arc<dyn Filter<M>>,
    inner: Arc<dyn Handler<M>>,
}

impl<M: Message> Filtered<M> {
    /// Wraps `inner` with `filter`.
    pub fn new(filter: Arc<dyn Filter<M>>, inner: Arc<dyn Handler<M>>) -> Self {
        Self { filter, inner }
    }
}

impl<M: Message> Handler<M> for Filtered<M> {
    fn handle(&self, message: &M) -> Result<(), BoxError> {
        if self.filter.filter(message).is_pass() {
            self.inner.handle(message)
        } else {
            Ok(())
        }
    }

    fn on_error(&self, error: BoxError) {
        self.inner.on_error(error);
    }

    fn on_completed(&self) {
        self.inner.on_completed();
    }
}

/// A handler that receives its own copy of the message, rewritten by a
/// mutating filter.
///
/// The copy is private to this handler; other handlers in the same publish
/// see the original.
pub struct Mutated<M: Message + Clone> {
    filter: Arc<dyn MutatingFilter<M>>,
    inner: Arc<dyn Handler<M>>,
}

impl<M: Message + Clone> Mutated<M> {
    /// Wraps `inner` with `filter`.
    pub fn new(filter: Arc<dyn MutatingFilter<M>>, inner: Arc<dyn Handler<M>>) -> Self {
        Self { filter, inner }
    }
}

impl<M: Message + Clone> Handler<M> for Mutated<M> {
    fn handle(&self, message: &M) -> Result<(), BoxError> {
        let mut copy = message.clone();
        if self.filter.filter(&mut copy).is_pass() {
            self.inner.handle(&copy)
        } else {
            Ok(())
        }
    }

    fn on_error(&self, error: BoxError) {
        self.inner.on_error(error);
    }

    fn on_completed(&self) {
        self.inner.on_completed();
    }
}

/// A function handler that yields [`FuncResult::none`] when its filter blocks.
pub struct FilteredFunc<A: Message, R: Message> {
    filter: Arc<dyn Filter<A>>,
    inner: Arc<dyn FuncHandler<A, R>>,
}

impl<A: Message, R: Message> FilteredFunc<A, R> {
    /// Wraps `inner` with `filter`.
    pub fn new(filter: Arc<dyn Filter<A>>, inner: Arc<dyn FuncHandler<A, R>>) -> Self {
        Self { filter, inner }
    }
}

impl<A: Message, R: Message> FuncHandler<A, R> for FilteredFunc<A, R> {
    fn call(&self, arg: &A) -> Result<FuncResult<R>, BoxError> {
        if self.filter.filter(arg).is_pass() {
            self.inner.call(arg)
        } else {
            Ok(FuncResult::none())
        }
    }

    fn on_error(&self, error: BoxError) {
        self.inner.on_error(error);
    }

    fn on_completed(&self) {
        self.inner.on_completed();
    }
}

/// Applies `filters` to `handler`.
///
/// With no filters the handler is returned unchanged and nothing is
/// allocated.
pub fn filtered<M: Message>(
    handler: Arc<dyn Handler<M>>,
    filters: Vec<Arc<dyn Filter<M>>>,
) -> Arc<dyn Handler<M>> {
    match compose(filters) {
        Some(filter) => Arc::new(Filtered::new(filter, handler)),
        None => handler,
    }
}

/// Applies mutating `filters` to `handler`.
pub fn mutated<M: Message + Clone>(
    handler: Arc<dyn Handler<M>>,
    filters: Vec<Arc<dyn MutatingFilter<M>>>,
) -> Arc<dyn Handler<M>> {
    match compose_mutating(filters) {
        Some(filter) => Arc::new(Mutated::new(filter, handler)),
        None => handler,
    }
}

/// Applies `filters` to a function handler.
pub fn filtered_func<A: Message, R: Message>(
    handler: Arc<dyn FuncHandler<A, R>>,
    filters: Vec<Arc<dyn Filter<A>>>,
) -> Arc<dyn FuncHandler<A, R>> {
    match compose(filters) {
        Some(filter) => Arc::new(FilteredFunc::new(filter, handler)),
        None => handler,
    }
}
