//! The function dispatch core: handlers return values, and a publish reduces
//! them to one result under an [`Aggregation`] policy.

use crate::{
    config::DispatchConfig,
    filters::filtered_func,
    invoke::{guarded, notify},
    snapshot::Snapshot,
    subscribers::SubscriberSet,
};
use std::{fmt, iter::FusedIterator, sync::Arc};
use tidings_core::{
    Aggregation, Dispose, Filter, FuncHandler, FuncResult, Message, PublishFlags, Subscription,
};

/// A shared function handler.
pub type SharedFunc<A, R> = Arc<dyn FuncHandler<A, R>>;

/// Invokes function handlers with an argument of type `A` and aggregates
/// their results of type `R`.
///
/// Subscription and disposal follow the same rules as
/// [`Dispatcher`](crate::Dispatcher). A handler whose invocation fails counts
/// as [`FuncResult::none`] and has the failure sent to its
/// [`on_error`](FuncHandler::on_error).
pub struct FuncDispatcher<A: Message, R: Message> {
    subscribers: SubscriberSet<SharedFunc<A, R>>,
    config: Arc<DispatchConfig>,
}

/// Running state of one aggregation.
struct Fold<R> {
    policy: Aggregation,
    acc: Option<FuncResult<R>>,
}

impl<R> Fold<R> {
    fn new(policy: Aggregation) -> Self {
        Self { policy, acc: None }
    }

    /// Feeds one result; returns `true` when no further handler may run.
    fn push(&mut self, result: FuncResult<R>) -> bool {
        let keep = match self.policy {
            Aggregation::ReturnFirst | Aggregation::ReturnFirstAndStop => self.acc.is_none(),
            Aggregation::ReturnFirstSuccess | Aggregation::ReturnFirstSuccessAndStop => {
                self.acc.is_none() && result.is_success()
            }
            Aggregation::ReturnLast => true,
            Aggregation::ReturnLastSuccess => result.is_success(),
        };
        if keep {
            self.acc = Some(result);
        }
        keep && self.policy.stops_early()
    }

    fn finish(self) -> FuncResult<R> {
        self.acc.unwrap_or_default()
    }
}

impl<A: Message, R: Message> FuncDispatcher<A, R> {
    /// Create a dispatcher with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Arc::new(DispatchConfig::default()))
    }

    /// Create a dispatcher sharing `config`.
    pub fn with_config(config: Arc<DispatchConfig>) -> Self {
        Self {
            subscribers: SubscriberSet::new(&config),
            config,
        }
    }

    /// Register a function handler.
    pub fn subscribe<H: FuncHandler<A, R>>(&self, handler: H) -> Subscription {
        self.subscribe_shared(Arc::new(handler))
    }

    /// Register a shared function handler.
    pub fn subscribe_shared(&self, handler: SharedFunc<A, R>) -> Subscription {
        match self.subscribers.insert(handler) {
            Ok(subscription) => subscription,
            Err(handler) => {
                notify(self.config.catch_panics, "on_completed", || handler.on_completed());
                Subscription::empty()
            }
        }
    }

    /// Register a function handler behind `filters`. A blocked argument
    /// yields [`FuncResult::none`] for that handler without calling it.
    pub fn subscribe_filtered(
        &self,
        handler: SharedFunc<A, R>,
        filters: Vec<Arc<dyn Filter<A>>>,
    ) -> Subscription {
        self.subscribe_shared(filtered_func(handler, filters))
    }

    /// Invoke every handler and reduce the results under `policy`.
    ///
    /// Returns [`FuncResult::none`] when no handler is subscribed, when the
    /// dispatcher is disposed, or when a success-seeking policy sees none.
    pub fn publish(&self, arg: &A, policy: Aggregation) -> FuncResult<R> {
        let Some(snapshot) = self.subscribers.snapshot() else {
            return FuncResult::none();
        };
        let mut fold = Fold::new(policy);
        for handler in snapshot.iter() {
            if fold.push(self.invoke_handler(handler, arg)) {
                break;
            }
        }
        fold.finish()
    }

    /// Lazily invoke handlers, yielding one result per handler.
    ///
    /// Each call takes a fresh snapshot. Handlers run only as the iterator is
    /// advanced; dropping it early leaves the rest uninvoked. With
    /// [`PublishFlags::SKIP_FAILURES`] failed results are left out, but their
    /// handlers still run.
    pub fn publish_iter<'a>(&'a self, arg: &'a A, flags: PublishFlags) -> Results<'a, A, R> {
        Results {
            dispatcher: self,
            snapshot: self.subscribers.snapshot(),
            arg,
            next: 0,
            flags,
        }
    }

    /// A point-in-time copy of the subscribed handlers.
    ///
    /// Together with [`invoke`](FuncDispatcher::invoke) this is the read-only
    /// surface for building external pipelines.
    pub fn handlers(&self) -> Snapshot<'_, SharedFunc<A, R>> {
        self.subscribers
            .snapshot()
            .unwrap_or_else(|| Snapshot::detached(Vec::new()))
    }

    /// Invoke one handler with failure isolation, panics included.
    pub fn invoke(handler: &SharedFunc<A, R>, arg: &A) -> FuncResult<R> {
        invoke_with(true, handler, arg)
    }

    fn invoke_handler(&self, handler: &SharedFunc<A, R>, arg: &A) -> FuncResult<R> {
        invoke_with(self.config.catch_panics, handler, arg)
    }

    /// Dispose the dispatcher. Only the first call has an effect.
    pub fn dispose(&self) {
        let Some(drained) = self.subscribers.dispose() else {
            return;
        };
        tracing::debug!(
            arg_type = std::any::type_name::<A>(),
            result_type = std::any::type_name::<R>(),
            handlers = drained.len(),
            "function dispatcher disposed"
        );
        for handler in drained {
            notify(self.config.catch_panics, "on_completed", || handler.on_completed());
        }
    }

    /// Number of subscribed handlers.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Returns `true` if no handler is subscribed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` once the dispatcher has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.subscribers.is_disposed()
    }
}

fn invoke_with<A: Message, R: Message>(
    catch_panics: bool,
    handler: &SharedFunc<A, R>,
    arg: &A,
) -> FuncResult<R> {
    match guarded(catch_panics, || handler.call(arg)) {
        Ok(result) => result,
        Err(error) => {
            notify(catch_panics, "on_error", || handler.on_error(error));
            FuncResult::none()
        }
    }
}

impl<A: Message, R: Message> Default for FuncDispatcher<A, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Message, R: Message> Clone for FuncDispatcher<A, R> {
    fn clone(&self) -> Self {
        Self {
            subscribers: self.subscribers.clone(),
            config: self.config.clone(),
        }
    }
}

impl<A: Message, R: Message> fmt::Debug for FuncDispatcher<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuncDispatcher")
            .field("arg_type", &std::any::type_name::<A>())
            .field("result_type", &std::any::type_name::<R>())
            .field("handlers", &self.len())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl<A: Message, R: Message> Dispose for FuncDispatcher<A, R> {
    fn dispose(&self) {
        FuncDispatcher::dispose(self)
    }

    fn is_disposed(&self) -> bool {
        FuncDispatcher::is_disposed(self)
    }
}

/// Lazy per-handler results of one publish.
///
/// Created by [`FuncDispatcher::publish_iter`].
pub struct Results<'a, A: Message, R: Message> {
    dispatcher: &'a FuncDispatcher<A, R>,
    snapshot: Option<Snapshot<'a, SharedFunc<A, R>>>,
    arg: &'a A,
    next: usize,
    flags: PublishFlags,
}

impl<A: Message, R: Message> Iterator for Results<'_, A, R> {
    type Item = FuncResult<R>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let snapshot = self.snapshot.as_ref()?;
            let Some(handler) = snapshot.get(self.next) else {
                // Exhausted: hand the buffer back now rather than on drop.
                self.snapshot = None;
                return None;
            };
            self.next += 1;
            let result = self.dispatcher.invoke_handler(handler, self.arg);
            if self.flags.contains(PublishFlags::SKIP_FAILURES) && result.is_failure() {
                continue;
            }
            return Some(result);
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .snapshot
            .as_ref()
            .map_or(0, |s| s.len().saturating_sub(self.next));
        if self.flags.contains(PublishFlags::SKIP_FAILURES) {
            (0, Some(remaining))
        } else {
            (remaining, Some(remaining))
        }
    }
}

impl<A: Message, R: Message> FusedIterator for Results<'_, A, R> {}
