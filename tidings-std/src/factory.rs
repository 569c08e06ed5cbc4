//! Creation of dispatch cores from one validated configuration.

use crate::{
    config::DispatchConfig, dispatcher::Dispatcher, func::FuncDispatcher, keyed::KeyedDispatcher,
    lazy::LazyDispatcher,
};
use std::{fmt, hash::Hash, sync::Arc};
use tidings_core::{Message, Result};

/// Builds dispatchers that share one [`DispatchConfig`].
///
/// # Example
///
/// ```rust,ignore
/// let factory = DispatcherFactory::new(DispatchConfig::default().with_pool_size(4))?;
/// let ticks = factory.create::<Tick>();
/// let prices = factory.create_func::<Symbol, f64>();
/// ```
#[derive(Clone, Debug, Default)]
pub struct DispatcherFactory {
    config: Arc<DispatchConfig>,
}

impl DispatcherFactory {
    /// Validates `config` and wraps it for sharing.
    pub fn new(config: DispatchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// The configuration handed to every created core.
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// A message dispatcher.
    pub fn create<M: Message>(&self) -> Dispatcher<M> {
        Dispatcher::with_config(self.config.clone())
    }

    /// A function dispatcher.
    pub fn create_func<A: Message, R: Message>(&self) -> FuncDispatcher<A, R> {
        FuncDispatcher::with_config(self.config.clone())
    }

    /// A lazy message dispatcher.
    pub fn create_lazy<M: Message>(&self) -> LazyDispatcher<M> {
        LazyDispatcher::with_config(self.config.clone())
    }

    /// A keyed multiplexer.
    pub fn create_keyed<K, M>(&self) -> KeyedDispatcher<K, M>
    where
        K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
        M: Message,
    {
        KeyedDispatcher::with_config(self.config.clone())
    }
}
