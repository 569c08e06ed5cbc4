//! The message dispatch core.

use crate::{
    config::DispatchConfig,
    filters::{filtered, lift, mutated},
    invoke::{guarded, notify},
    subscribers::SubscriberSet,
};
use std::{fmt, sync::Arc};
use tidings_core::{
    Dispose, Filter, Handler, Message, MutatingFilter, Publish, Subscribe, Subscription,
};

/// Delivers messages of type `M` to every subscribed handler.
///
/// A `Dispatcher` is a cheap handle: clones share the same subscriber set.
///
/// # Lifecycle
///
/// A dispatcher starts active. [`dispose`](Dispatcher::dispose) moves it to
/// the disposed state for good: every subscribed handler is notified of
/// completion once, publishing becomes a no-op, and a handler subscribing
/// afterwards is notified of completion immediately instead of being added.
///
/// # Reentrancy
///
/// Handlers run without any dispatcher lock held. A handler may subscribe,
/// dispose its own token, publish, or dispose the dispatcher. Changes to the
/// subscriber set made during a publish are not seen by that publish.
///
/// # Example
/// ```ignore
/// let dispatcher = Dispatcher::<Tick>::new();
/// let token = dispatcher.subscribe(|tick: &Tick| println!("{tick:?}"));
/// dispatcher.publish(&Tick(1));
/// token.dispose();
/// ```
pub struct Dispatcher<M: Message> {
    subscribers: SubscriberSet<Arc<dyn Handler<M>>>,
    defaults: Arc<[Arc<dyn Filter<M>>]>,
    config: Arc<DispatchConfig>,
}

impl<M: Message> Dispatcher<M> {
    /// Create a dispatcher with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Arc::new(DispatchConfig::default()))
    }

    /// Create a dispatcher sharing `config`.
    pub fn with_config(config: Arc<DispatchConfig>) -> Self {
        Self {
            subscribers: SubscriberSet::new(&config),
            defaults: Arc::new([]),
            config,
        }
    }

    /// Set filters applied in front of every handler subscribed from now on.
    ///
    /// At equal order keys these run before filters passed to
    /// [`subscribe_filtered`](Dispatcher::subscribe_filtered).
    pub fn with_default_filters(mut self, filters: Vec<Arc<dyn Filter<M>>>) -> Self {
        self.defaults = filters.into();
        self
    }

    /// Register a handler.
    pub fn subscribe<H: Handler<M>>(&self, handler: H) -> Subscription {
        self.subscribe_shared(Arc::new(handler))
    }

    /// Register a shared handler. The same `Arc` may be registered twice.
    pub fn subscribe_shared(&self, handler: Arc<dyn Handler<M>>) -> Subscription {
        self.subscribe_filtered(handler, Vec::new())
    }

    /// Register a handler behind `filters`, after the default filters.
    pub fn subscribe_filtered(
        &self,
        handler: Arc<dyn Handler<M>>,
        filters: Vec<Arc<dyn Filter<M>>>,
    ) -> Subscription {
        let filters = if self.defaults.is_empty() {
            filters
        } else {
            self.defaults.iter().cloned().chain(filters).collect()
        };
        self.insert(filtered(handler, filters))
    }

    /// Register a handler behind mutating `filters`, after the default
    /// filters. The handler receives its own rewritten copy of each message.
    pub fn subscribe_mutated(
        &self,
        handler: Arc<dyn Handler<M>>,
        filters: Vec<Arc<dyn MutatingFilter<M>>>,
    ) -> Subscription
    where
        M: Clone,
    {
        let mut chain: Vec<Arc<dyn MutatingFilter<M>>> = self
            .defaults
            .iter()
            .map(|f| lift(f.clone()))
            .collect();
        chain.extend(filters);
        self.insert(mutated(handler, chain))
    }

    fn insert(&self, handler: Arc<dyn Handler<M>>) -> Subscription {
        match self.subscribers.insert(handler) {
            Ok(subscription) => subscription,
            Err(handler) => {
                notify(self.config.catch_panics, "on_completed", || handler.on_completed());
                Subscription::empty()
            }
        }
    }

    /// Deliver `message` to every handler, in subscription order.
    ///
    /// A handler that fails or panics has the failure sent to its own
    /// [`on_error`](Handler::on_error); the remaining handlers still run.
    pub fn publish(&self, message: &M) {
        let Some(snapshot) = self.subscribers.snapshot() else {
            return;
        };
        for handler in snapshot.iter() {
            if let Err(error) = guarded(self.config.catch_panics, || handler.handle(message)) {
                notify(self.config.catch_panics, "on_error", || handler.on_error(error));
            }
        }
    }

    /// Dispose the dispatcher. Only the first call has an effect.
    pub fn dispose(&self) {
        let Some(drained) = self.subscribers.dispose() else {
            return;
        };
        tracing::debug!(
            message_type = std::any::type_name::<M>(),
            handlers = drained.len(),
            "dispatcher disposed"
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

    /// The configuration this dispatcher was built with.
    pub fn config(&self) -> &Arc<DispatchConfig> {
        &self.config
    }
}

impl<M: Message> Default for Dispatcher<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Message> Clone for Dispatcher<M> {
    fn clone(&self) -> Self {
        Self {
            subscribers: self.subscribers.clone(),
            defaults: self.defaults.clone(),
            config: self.config.clone(),
        }
    }
}

impl<M: Message> fmt::Debug for Dispatcher<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("message_type", &std::any::type_name::<M>())
            .field("handlers", &self.len())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl<M: Message> Subscribe<M> for Dispatcher<M> {
    fn subscribe_shared(&self, handler: Arc<dyn Handler<M>>) -> Subscription {
        Dispatcher::subscribe_shared(self, handler)
    }
}

impl<M: Message> Publish<M> for Dispatcher<M> {
    fn publish(&self, message: &M) {
        Dispatcher::publish(self, message)
    }
}

impl<M: Message> Dispose for Dispatcher<M> {
    fn dispose(&self) {
        Dispatcher::dispose(self)
    }

    fn is_disposed(&self) -> bool {
        Dispatcher::is_disposed(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CountingHandler, RecordingHandler};
    use parking_lot::Mutex;
    use tidings_core::{BoxError, Flow, HandlerError, filter_fn};

    #[test]
    fn test_publish_in_subscription_order() {
        let dispatcher = Dispatcher::<u32>::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for id in 0..5 {
            let order = order.clone();
            dispatcher.subscribe(move |_: &u32| order.lock().push(id));
        }

        dispatcher.publish(&1);
        assert_eq!(*order.lock(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_publish_without_handlers() {
        let dispatcher = Dispatcher::<u32>::new();
        dispatcher.publish(&1);
        assert!(dispatcher.is_empty());
    }

    #[test]
    fn test_same_handler_twice_gets_two_tokens() {
        let dispatcher = Dispatcher::<u32>::new();
        let counter = CountingHandler::new();
        let shared: Arc<dyn Handler<u32>> = Arc::new(counter.clone());

        let first = dispatcher.subscribe_shared(shared.clone());
        let _second = dispatcher.subscribe_shared(shared);
        dispatcher.publish(&1);
        assert_eq!(counter.count(), 2);

        first.dispose();
        dispatcher.publish(&1);
        assert_eq!(counter.count(), 3);
        assert_eq!(dispatcher.len(), 1);
    }

    #[test]
    fn test_dispose_completes_each_handler_once() {
        let dispatcher = Dispatcher::<u32>::new();
        let kept = RecordingHandler::<u32>::new();
        let removed = RecordingHandler::<u32>::new();
        dispatcher.subscribe(kept.clone());
        dispatcher.subscribe(removed.clone()).dispose();

        dispatcher.dispose();
        dispatcher.dispose();

        assert_eq!(kept.completions(), 1);
        assert_eq!(removed.completions(), 0);
        assert!(dispatcher.is_disposed());
        assert!(dispatcher.is_empty());
    }

    #[test]
    fn test_panicking_completion_does_not_stop_dispose() {
        let dispatcher = Dispatcher::<u32>::new();
        dispatcher.subscribe(
            tidings_core::FnHandler::new(|_: &u32| {})
                .with_completed(|| panic!("completion panicked")),
        );
        let after = CountingHandler::new();
        dispatcher.subscribe(after.clone());

        dispatcher.dispose();

        assert_eq!(after.completions(), 1);
        assert!(dispatcher.is_disposed());
    }

    #[test]
    fn test_panicking_error_channel_does_not_stop_publish() {
        let dispatcher = Dispatcher::<u32>::new();
        dispatcher.subscribe(
            tidings_core::FnHandler::new(|_: &u32| Err::<(), BoxError>("refused".into()))
                .with_error(|_| panic!("error channel panicked")),
        );
        let after = CountingHandler::new();
        dispatcher.subscribe(after.clone());

        dispatcher.publish(&1);
        dispatcher.publish(&2);

        assert_eq!(after.count(), 2);
    }

    #[test]
    fn test_subscribe_after_dispose_completes_immediately() {
        let dispatcher = Dispatcher::<u32>::new();
        dispatcher.dispose();

        let late = RecordingHandler::<u32>::new();
        let token = dispatcher.subscribe(late.clone());
        assert!(token.is_disposed());
        assert_eq!(late.completions(), 1);
        assert_eq!(dispatcher.len(), 0);

        dispatcher.publish(&9);
        assert_eq!(late.count(), 0);
    }

    #[test]
    fn test_failure_goes_to_own_error_channel() {
        let dispatcher = Dispatcher::<u32>::new();
        let failing =
            RecordingHandler::<u32>::failing(|_| Some(BoxError::from("handler broke")));
        let healthy = RecordingHandler::<u32>::new();
        dispatcher.subscribe(failing.clone());
        dispatcher.subscribe(healthy.clone());

        dispatcher.publish(&3);

        assert_eq!(failing.error_messages(), vec!["handler broke".to_string()]);
        assert_eq!(healthy.messages(), vec![3]);
        assert_eq!(healthy.error_count(), 0);
    }

    #[test]
    fn test_panic_is_isolated() {
        let dispatcher = Dispatcher::<u32>::new();
        let errors = Arc::new(Mutex::new(Vec::new()));
        let e = errors.clone();
        dispatcher.subscribe(
            tidings_core::FnHandler::new(|_: &u32| -> () { panic!("handler panicked") })
                .with_error(move |err| e.lock().push(err)),
        );
        let after = CountingHandler::new();
        dispatcher.subscribe(after.clone());

        dispatcher.publish(&1);

        assert_eq!(after.count(), 1);
        let errors = errors.lock();
        assert_eq!(
            errors[0].downcast_ref::<HandlerError>(),
            Some(&HandlerError::Panicked("handler panicked".into()))
        );
    }

    #[test]
    fn test_self_unsubscribe_during_publish() {
        let dispatcher = Dispatcher::<u32>::new();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let calls = CountingHandler::new();

        let s = slot.clone();
        let c = calls.clone();
        let token = dispatcher.subscribe(move |m: &u32| {
            Handler::<u32>::handle(&c, m)?;
            if let Some(token) = s.lock().as_ref() {
                token.dispose();
            }
            Ok::<_, BoxError>(())
        });
        *slot.lock() = Some(token);
        let after = CountingHandler::new();
        dispatcher.subscribe(after.clone());

        dispatcher.publish(&1);
        dispatcher.publish(&2);

        assert_eq!(calls.count(), 1);
        assert_eq!(after.count(), 2);
    }

    #[test]
    fn test_subscribe_during_publish_not_seen() {
        let dispatcher = Dispatcher::<u32>::new();
        let added = CountingHandler::new();

        let d = dispatcher.clone();
        let a = added.clone();
        dispatcher.subscribe(move |_: &u32| {
            d.subscribe(a.clone());
        });

        dispatcher.publish(&1);
        assert_eq!(added.count(), 0);
        assert_eq!(dispatcher.len(), 2);

        dispatcher.publish(&2);
        assert_eq!(added.count(), 1);
    }

    #[test]
    fn test_dispose_from_handler() {
        let dispatcher = Dispatcher::<u32>::new();
        let d = dispatcher.clone();
        dispatcher.subscribe(move |_: &u32| d.dispose());
        let second = RecordingHandler::<u32>::new();
        dispatcher.subscribe(second.clone());

        dispatcher.publish(&1);

        // The running publish still reaches its snapshot.
        assert_eq!(second.messages(), vec![1]);
        assert_eq!(second.completions(), 1);
        dispatcher.publish(&2);
        assert_eq!(second.count(), 1);
    }

    #[test]
    fn test_default_filters_run_before_call_site_filters() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let l = log.clone();
        let default: Arc<dyn Filter<u32>> = Arc::new(filter_fn(0, move |_: &u32| {
            l.lock().push("default");
            Flow::Pass
        }));
        let dispatcher = Dispatcher::<u32>::new().with_default_filters(vec![default]);

        let l = log.clone();
        let call_site: Arc<dyn Filter<u32>> = Arc::new(filter_fn(0, move |_: &u32| {
            l.lock().push("call-site");
            Flow::Pass
        }));
        let recorder = RecordingHandler::<u32>::new();
        dispatcher.subscribe_filtered(Arc::new(recorder.clone()), vec![call_site]);

        dispatcher.publish(&1);
        assert_eq!(*log.lock(), vec!["default", "call-site"]);
        assert_eq!(recorder.count(), 1);
    }

    #[test]
    fn test_catch_panics_can_be_disabled() {
        let config = Arc::new(DispatchConfig::default().with_catch_panics(false));
        let dispatcher = Dispatcher::<u32>::with_config(config);
        dispatcher.subscribe(|_: &u32| -> () { panic!("escapes") });

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            dispatcher.publish(&1);
        }));
        assert!(result.is_err());
        // The set is untouched by the unwind.
        assert_eq!(dispatcher.len(), 1);
    }
}
