//! Subscription tokens.

use parking_lot::Mutex;
use std::fmt;

type Cancel = Box<dyn FnOnce() + Send>;

/// A handle to one subscription.
///
/// Disposing the token removes exactly the handler instance it was created
/// for. Disposal is idempotent and safe to call from inside the handler
/// itself. Dropping a token does **not** unsubscribe.
pub struct Subscription {
    cancel: Mutex<Option<Cancel>>,
}

impl Subscription {
    /// Creates a token that runs `cancel` on its first disposal.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Mutex::new(Some(Box::new(cancel))),
        }
    }

    /// A token that does nothing when disposed.
    pub fn empty() -> Self {
        Self {
            cancel: Mutex::new(None),
        }
    }

    /// Cancels the subscription. Later calls do nothing.
    pub fn dispose(&self) {
        // The lock is released before `cancel` runs so that it may re-enter.
        let cancel = self.cancel.lock().take();
        if let Some(cancel) = cancel {
            cancel();
        }
    }

    /// Returns `true` once the token has been disposed, or if it was empty.
    pub fn is_disposed(&self) -> bool {
        self.cancel.lock().is_none()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// A set of subscriptions disposed together.
#[derive(Debug, Default)]
pub struct CompositeSubscription {
    items: Mutex<Vec<Subscription>>,
}

impl CompositeSubscription {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a token to the set.
    pub fn push(&self, subscription: Subscription) {
        self.items.lock().push(subscription);
    }

    /// Number of tokens held.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Returns `true` if the set holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Disposes every token in insertion order and empties the set.
    pub fn dispose(&self) {
        let items = std::mem::take(&mut *self.items.lock());
        for item in &items {
            item.dispose();
        }
    }
}

impl FromIterator<Subscription> for CompositeSubscription {
    fn from_iter<I: IntoIterator<Item = Subscription>>(iter: I) -> Self {
        Self {
            items: Mutex::new(iter.into_iter().collect()),
        }
    }
}
