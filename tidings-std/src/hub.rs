//! A registry holding one message dispatcher per message type.

use crate::{dispatcher::Dispatcher, factory::DispatcherFactory};
use parking_lot::Mutex;
use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
};
use tidings_core::{Error, Message, Result};

/// Type-erased view of a registered dispatcher.
trait ErasedCore: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn dispose(&self);
}

impl<M: Message> ErasedCore for Dispatcher<M> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dispose(&self) {
        Dispatcher::dispose(self)
    }
}

struct Entry {
    type_name: &'static str,
    core: Box<dyn ErasedCore>,
}

impl Entry {
    fn new<M: Message>(core: Dispatcher<M>) -> Self {
        Self {
            type_name: std::any::type_name::<M>(),
            core: Box::new(core),
        }
    }

    fn downcast<M: Message>(&self) -> Option<Dispatcher<M>> {
        self.core.as_any().downcast_ref::<Dispatcher<M>>().cloned()
    }
}

/// Looks up dispatchers by message type.
///
/// Every lookup hands out a clone sharing the registered dispatcher's
/// subscribers, so publishers and subscribers can find each other without
/// passing dispatchers around.
///
/// # Example
///
/// ```rust,ignore
/// let hub = Hub::new(DispatcherFactory::default());
/// hub.get_or_create::<Tick>().subscribe(|t: &Tick| println!("{t:?}"));
/// hub.get::<Tick>()?.publish(&Tick(1));
/// ```
pub struct Hub {
    factory: DispatcherFactory,
    cores: Mutex<HashMap<TypeId, Entry>>,
}

impl Hub {
    /// Create an empty hub that builds missing dispatchers with `factory`.
    pub fn new(factory: DispatcherFactory) -> Self {
        Self {
            factory,
            cores: Mutex::new(HashMap::new()),
        }
    }

    /// Register `core` as the dispatcher for `M`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateRegistration`] if `M` already has one.
    pub fn register<M: Message>(&self, core: Dispatcher<M>) -> Result<()> {
        let mut cores = self.cores.lock();
        if cores.contains_key(&TypeId::of::<M>()) {
            return Err(Error::DuplicateRegistration {
                type_name: std::any::type_name::<M>(),
            });
        }
        cores.insert(TypeId::of::<M>(), Entry::new(core));
        tracing::debug!(message_type = std::any::type_name::<M>(), "hub registered dispatcher");
        Ok(())
    }

    /// The dispatcher for `M`, created on first use.
    pub fn get_or_create<M: Message>(&self) -> Dispatcher<M> {
        let mut cores = self.cores.lock();
        if let Some(core) = cores.get(&TypeId::of::<M>()).and_then(Entry::downcast::<M>) {
            return core;
        }
        let core = self.factory.create::<M>();
        cores.insert(TypeId::of::<M>(), Entry::new(core.clone()));
        core
    }

    /// The dispatcher for `M`, if registered.
    pub fn try_get<M: Message>(&self) -> Option<Dispatcher<M>> {
        self.cores
            .lock()
            .get(&TypeId::of::<M>())
            .and_then(Entry::downcast::<M>)
    }

    /// The dispatcher for `M`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if `M` has none.
    pub fn get<M: Message>(&self) -> Result<Dispatcher<M>> {
        self.try_get::<M>()
            .ok_or_else(|| Error::KeyNotFound(std::any::type_name::<M>().to_string()))
    }

    /// Number of registered message types.
    pub fn len(&self) -> usize {
        self.cores.lock().len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dispose every registered dispatcher and empty the hub.
    pub fn dispose_all(&self) {
        let drained = std::mem::take(&mut *self.cores.lock());
        tracing::debug!(dispatchers = drained.len(), "hub disposing all dispatchers");
        for entry in drained.into_values() {
            entry.core.dispose();
        }
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new(DispatcherFactory::default())
    }
}

impl fmt::Debug for Hub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let types: Vec<&'static str> = self.cores.lock().values().map(|e| e.type_name).collect();
        f.debug_struct("Hub").field("types", &types).finish()
    }
}
