//! Dispatcher configuration.

use tidings_core::{Error, Result};

/// Settings shared by every dispatcher built from one factory.
///
/// `DispatchConfig::default()` is the process-wide default; assemble it once
/// and hand it to [`DispatcherFactory`](crate::DispatcherFactory) rather than
/// reading global state.
///
/// # Example
/// ```ignore
/// let config = DispatchConfig::default()
///     .with_pool_size(4)
///     .with_catch_panics(false);
/// let factory = DispatcherFactory::new(config)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Idle snapshot buffers retained per dispatcher. Zero disables pooling.
    pub pool_size: usize,
    /// Buffers grown beyond this capacity are dropped instead of pooled.
    pub max_pooled_len: usize,
    /// Convert handler panics into [`HandlerError::Panicked`].
    ///
    /// [`HandlerError::Panicked`]: tidings_core::HandlerError::Panicked
    pub catch_panics: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            pool_size: 16,
            max_pooled_len: 1024,
            catch_panics: true,
        }
    }
}

impl DispatchConfig {
    /// Set the number of pooled snapshot buffers.
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Set the largest buffer capacity kept in the pool.
    pub fn with_max_pooled_len(mut self, max_pooled_len: usize) -> Self {
        self.max_pooled_len = max_pooled_len;
        self
    }

    /// Set whether handler panics are caught.
    pub fn with_catch_panics(mut self, catch_panics: bool) -> Self {
        self.catch_panics = catch_panics;
        self
    }

    /// Checks that the settings are consistent.
    pub fn validate(&self) -> Result<()> {
        if self.pool_size > 0 && self.max_pooled_len == 0 {
            return Err(Error::InvalidArgument(
                "max_pooled_len must be positive when pooling is enabled".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(DispatchConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_buffer_len_rejected() {
        let config = DispatchConfig::default().with_max_pooled_len(0);
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidArgument(_))
        ));

        // Without pooling the limit is irrelevant.
        let config = config.with_pool_size(0);
        assert!(config.validate().is_ok());
    }
}
