//! A dispatcher that allocates nothing until its first subscriber arrives.
//!
//! Until then it may instead be linked to a successor, in which case every
//! subscription is forwarded and the own core is never allocated.

use crate::{config::DispatchConfig, dispatcher::Dispatcher, invoke::notify};
use parking_lot::Mutex;
use std::{fmt, sync::Arc};
use tidings_core::{
    Dispose, Handler, LifecycleError, Message, Publish, Result, Subscribe, Subscription,
};

enum State<M: Message> {
    Pending {
        next: Option<Arc<dyn Subscribe<M>>>,
    },
    Materialized(Dispatcher<M>),
    Disposed,
}

/// A deferred message dispatcher.
///
/// # Example
///
/// ```rust,ignore
/// let upstream = Arc::new(LazyDispatcher::<Tick>::new());
/// let local = LazyDispatcher::<Tick>::new();
/// local.set_next(upstream.clone())?;
///
/// local.subscribe(|t: &Tick| println!("{t:?}"));
/// assert!(!local.is_materialized());
/// upstream.publish(&Tick(1));
/// ```
pub struct LazyDispatcher<M: Message> {
    state: Mutex<State<M>>,
    config: Arc<DispatchConfig>,
}

impl<M: Message> LazyDispatcher<M> {
    /// Create a lazy dispatcher with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Arc::new(DispatchConfig::default()))
    }

    /// Create a lazy dispatcher whose core, once allocated, uses `config`.
    pub fn with_config(config: Arc<DispatchConfig>) -> Self {
        Self {
            state: Mutex::new(State::Pending { next: None }),
            config,
        }
    }

    /// Forward all future subscriptions to `next`.
    ///
    /// Only one link is allowed, and only before the dispatcher has
    /// materialized its own core or been disposed.
    pub fn set_next(&self, next: Arc<dyn Subscribe<M>>) -> Result<()> {
        let mut state = self.state.lock();
        match &mut *state {
            State::Pending { next: slot @ None } => {
                *slot = Some(next);
                tracing::debug!(
                    message_type = std::any::type_name::<M>(),
                    "lazy dispatcher linked"
                );
                Ok(())
            }
            State::Pending { next: Some(_) } => Err(LifecycleError::AlreadyLinked.into()),
            State::Materialized(_) => Err(LifecycleError::AlreadyMaterialized.into()),
            State::Disposed => Err(LifecycleError::Disposed.into()),
        }
    }

    /// Register a handler, materializing the core if needed.
    pub fn subscribe<H: Handler<M>>(&self, handler: H) -> Subscription {
        self.subscribe_shared(Arc::new(handler))
    }

    /// Register a shared handler, materializing the core if needed.
    pub fn subscribe_shared(&self, handler: Arc<dyn Handler<M>>) -> Subscription {
        let target = {
            let mut state = self.state.lock();
            match &*state {
                State::Disposed => None,
                State::Pending { next: Some(next) } => Some(Target::Next(next.clone())),
                State::Materialized(core) => Some(Target::Own(core.clone())),
                State::Pending { next: None } => {
                    let core = Dispatcher::with_config(self.config.clone());
                    *state = State::Materialized(core.clone());
                    tracing::debug!(
                        message_type = std::any::type_name::<M>(),
                        "lazy dispatcher materialized"
                    );
                    Some(Target::Own(core))
                }
            }
        };
        match target {
            Some(Target::Own(core)) => core.subscribe_shared(handler),
            Some(Target::Next(next)) => next.subscribe_shared(handler),
            None => {
                notify(self.config.catch_panics, "on_completed", || handler.on_completed());
                Subscription::empty()
            }
        }
    }

    /// Deliver `message` through the own core. Before materialization this
    /// does nothing; a linked dispatcher never materializes.
    pub fn publish(&self, message: &M) {
        let core = match &*self.state.lock() {
            State::Materialized(core) => core.clone(),
            _ => return,
        };
        core.publish(message);
    }

    /// Dispose the own core, if any. The successor is left untouched.
    pub fn dispose(&self) {
        let previous = std::mem::replace(&mut *self.state.lock(), State::Disposed);
        if let State::Materialized(core) = previous {
            core.dispose();
        }
    }

    /// Returns `true` once the own core has been allocated.
    pub fn is_materialized(&self) -> bool {
        matches!(&*self.state.lock(), State::Materialized(_))
    }

    /// Returns `true` if subscriptions are forwarded to a successor.
    pub fn is_linked(&self) -> bool {
        matches!(&*self.state.lock(), State::Pending { next: Some(_) })
    }

    /// Returns `true` once the dispatcher has been disposed.
    pub fn is_disposed(&self) -> bool {
        matches!(&*self.state.lock(), State::Disposed)
    }

    /// Number of handlers in the own core.
    pub fn len(&self) -> usize {
        match &*self.state.lock() {
            State::Materialized(core) => core.len(),
            _ => 0,
        }
    }

    /// Returns `true` if the own core holds no handler.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

enum Target<M: Message> {
    Own(Dispatcher<M>),
    Next(Arc<dyn Subscribe<M>>),
}

impl<M: Message> Default for LazyDispatcher<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Message> fmt::Debug for LazyDispatcher<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.state.lock() {
            State::Pending { next: None } => "pending",
            State::Pending { next: Some(_) } => "linked",
            State::Materialized(_) => "materialized",
            State::Disposed => "disposed",
        };
        f.debug_struct("LazyDispatcher")
            .field("message_type", &std::any::type_name::<M>())
            .field("state", &state)
            .finish()
    }
}

impl<M: Message> Subscribe<M> for LazyDispatcher<M> {
    fn subscribe_shared(&self, handler: Arc<dyn Handler<M>>) -> Subscription {
        LazyDispatcher::subscribe_shared(self, handler)
    }
}

impl<M: Message> Publish<M> for LazyDispatcher<M> {
    fn publish(&self, message: &M) {
        LazyDispatcher::publish(self, message)
    }
}

impl<M: Message> Dispose for LazyDispatcher<M> {
    fn dispose(&self) {
        LazyDispatcher::dispose(self)
    }

    fn is_disposed(&self) -> bool {
        LazyDispatcher::is_disposed(self)
    }
}
