//! # Filters
//!
//! A filter is a gate applied to a message before a handler sees it.
//!
//! - [`Filter`] inspects a message and decides [`Flow::Pass`] or [`Flow::Block`].
//! - [`MutatingFilter`] may also rewrite the message it inspects. Mutation and
//!   the pass/block decision are independent.
//!
//! Every filter carries an [`order`](Filter::order) key. When several filters
//! are composed they run in ascending order, and filters with the same key
//! keep their relative insertion order.

use crate::message::Message;

/// The decision of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    /// Let the message through to the next filter or the handler.
    Pass,
    /// Drop the message for this handler.
    Block,
}

impl Flow {
    /// Returns `true` for [`Flow::Pass`].
    pub const fn is_pass(self) -> bool {
        matches!(self, Flow::Pass)
    }
}

impl From<bool> for Flow {
    fn from(pass: bool) -> Self {
        if pass { Flow::Pass } else { Flow::Block }
    }
}

/// A read-only gate in front of a handler.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Filter` for `{M}`",
    label = "missing `Filter<{M}>` implementation",
    note = "Filters must implement `filter(&{M}) -> Flow`."
)]
pub trait Filter<M: Message>: Send + Sync + 'static {
    /// Sort key; lower runs first.
    fn order(&self) -> i32 {
        0
    }

    /// Decides whether `message` reaches the handler.
    fn filter(&self, message: &M) -> Flow;
}

/// A gate that may rewrite the message it inspects.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `MutatingFilter` for `{M}`",
    label = "missing `MutatingFilter<{M}>` implementation",
    note = "Mutating filters must implement `filter(&mut {M}) -> Flow`."
)]
pub trait MutatingFilter<M: Message>: Send + Sync + 'static {
    /// Sort key; lower runs first.
    fn order(&self) -> i32 {
        0
    }

    /// Inspects and possibly rewrites `message`.
    fn filter(&self, message: &mut M) -> Flow;
}

// Closures are filters with the default order.
impl<M, F> Filter<M> for F
where
    M: Message,
    F: Fn(&M) -> Flow + Send + Sync + 'static,
{
    fn filter(&self, message: &M) -> Flow {
        (self)(message)
    }
}

impl<M, F> MutatingFilter<M> for F
where
    M: Message,
    F: Fn(&mut M) -> Flow + Send + Sync + 'static,
{
    fn filter(&self, message: &mut M) -> Flow {
        (self)(message)
    }
}

/// A closure filter with an explicit order key.
///
/// Built by [`filter_fn`] and [`mutate_fn`].
#[derive(Clone)]
pub struct FilterFn<F> {
    order: i32,
    f: F,
}

/// Creates a [`Filter`] from a closure with the given order key.
pub fn filter_fn<M, F>(order: i32, f: F) -> FilterFn<F>
where
    M: Message,
    F: Fn(&M) -> Flow + Send + Sync + 'static,
{
    FilterFn { order, f }
}

/// Creates a [`MutatingFilter`] from a closure with the given order key.
pub fn mutate_fn<M, F>(order: i32, f: F) -> FilterFn<F>
where
    M: Message,
    F: Fn(&mut M) -> Flow + Send + Sync + 'static,
{
    FilterFn { order, f }
}

impl<M, F> Filter<M> for FilterFn<F>
where
    M: Message,
    F: Fn(&M) -> Flow + Send + Sync + 'static,
{
    fn order(&self) -> i32 {
        self.order
    }

    fn filter(&self, message: &M) -> Flow {
        (self.f)(message)
    }
}

impl<M, F> MutatingFilter<M> for FilterFn<F>
where
    M: Message,
    F: Fn(&mut M) -> Flow + Send + Sync + 'static,
{
    fn order(&self) -> i32 {
        self.order
    }

    fn filter(&self, message: &mut M) -> Flow {
        (self.f)(message)
    }
}

/// Lifts a read-only [`Filter`] into a [`MutatingFilter`] so both kinds can
/// share one chain.
#[derive(Clone)]
pub struct Inspect<F>(pub F);

impl<M, F> MutatingFilter<M> for Inspect<F>
where
    M: Message,
    F: Filter<M>,
{
    fn order(&self) -> i32 {
        Filter::order(&self.0)
    }

    fn filter(&self, message: &mut M) -> Flow {
        Filter::filter(&self.0, message)
    }
}
