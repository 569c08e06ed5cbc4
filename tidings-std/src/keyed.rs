//! Routes messages to one dispatcher per key.

use crate::{config::DispatchConfig, dispatcher::Dispatcher, invoke::notify};
use parking_lot::Mutex;
use std::{collections::HashMap, fmt, hash::Hash, sync::Arc};
use tidings_core::{Dispose, Error, Handler, Message, Result, Subscription};

/// A keyed multiplexer of message dispatchers.
///
/// A key's dispatcher is created on its first subscription. Publishing to a
/// key without subscribers does not create one.
pub struct KeyedDispatcher<K, M: Message> {
    // `None` once disposed.
    cores: Mutex<Option<HashMap<K, Dispatcher<M>>>>,
    config: Arc<DispatchConfig>,
}

impl<K, M> KeyedDispatcher<K, M>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    M: Message,
{
    /// Create a multiplexer with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Arc::new(DispatchConfig::default()))
    }

    /// Create a multiplexer whose per-key dispatchers use `config`.
    pub fn with_config(config: Arc<DispatchConfig>) -> Self {
        Self {
            cores: Mutex::new(Some(HashMap::new())),
            config,
        }
    }

    /// Register a handler under `key`.
    pub fn subscribe<H: Handler<M>>(&self, key: K, handler: H) -> Subscription {
        self.subscribe_shared(key, Arc::new(handler))
    }

    /// Register a shared handler under `key`.
    pub fn subscribe_shared(&self, key: K, handler: Arc<dyn Handler<M>>) -> Subscription {
        let core = {
            let mut cores = self.cores.lock();
            cores.as_mut().map(|map| {
                map.entry(key)
                    .or_insert_with_key(|key| {
                        tracing::debug!(?key, "keyed dispatcher created core");
                        Dispatcher::with_config(self.config.clone())
                    })
                    .clone()
            })
        };
        match core {
            Some(core) => core.subscribe_shared(handler),
            None => {
                notify(self.config.catch_panics, "on_completed", || handler.on_completed());
                Subscription::empty()
            }
        }
    }

    /// Deliver `message` to the handlers under `key`.
    pub fn publish(&self, key: &K, message: &M) {
        if let Some(core) = self.try_get(key) {
            core.publish(message);
        }
    }

    /// Dispose every per-key dispatcher. Later subscriptions complete
    /// immediately and later publishes do nothing.
    pub fn dispose(&self) {
        let Some(cores) = self.cores.lock().take() else {
            return;
        };
        tracing::debug!(keys = cores.len(), "keyed dispatcher disposed");
        for core in cores.into_values() {
            core.dispose();
        }
    }

    /// Dispose and forget the dispatcher under `key`.
    ///
    /// Returns `true` if the key had one.
    pub fn dispose_key(&self, key: &K) -> bool {
        let removed = self.cores.lock().as_mut().and_then(|map| map.remove(key));
        match removed {
            Some(core) => {
                tracing::debug!(?key, "keyed dispatcher disposed core");
                core.dispose();
                true
            }
            None => false,
        }
    }

    /// The dispatcher under `key`, if any.
    pub fn try_get(&self, key: &K) -> Option<Dispatcher<M>> {
        self.cores.lock().as_ref()?.get(key).cloned()
    }

    /// The dispatcher under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if no dispatcher exists for `key`.
    pub fn get(&self, key: &K) -> Result<Dispatcher<M>> {
        self.try_get(key)
            .ok_or_else(|| Error::KeyNotFound(format!("{key:?}")))
    }

    /// Returns `true` if `key` has a dispatcher.
    pub fn contains_key(&self, key: &K) -> bool {
        self.cores
            .lock()
            .as_ref()
            .is_some_and(|map| map.contains_key(key))
    }

    /// Number of keys with a dispatcher.
    pub fn len(&self) -> usize {
        self.cores.lock().as_ref().map_or(0, HashMap::len)
    }

    /// Returns `true` if no key has a dispatcher.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` once the multiplexer has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.cores.lock().is_none()
    }
}

impl<K, M> Default for KeyedDispatcher<K, M>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    M: Message,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, M: Message> fmt::Debug for KeyedDispatcher<K, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys = self.cores.lock().as_ref().map(HashMap::len);
        f.debug_struct("KeyedDispatcher")
            .field("message_type", &std::any::type_name::<M>())
            .field("keys", &keys)
            .finish()
    }
}

impl<K, M> Dispose for KeyedDispatcher<K, M>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    M: Message,
{
    fn dispose(&self) {
        KeyedDispatcher::dispose(self)
    }

    fn is_disposed(&self) -> bool {
        KeyedDispatcher::is_disposed(self)
    }
}
