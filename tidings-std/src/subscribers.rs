//! The mutable subscriber set shared by every dispatch core.
//!
//! One `parking_lot::Mutex` serializes append, remove and the dispose
//! transition. Snapshots are copied inside the lock and iterated outside it,
//! and no handler code ever runs while the lock is held.

use crate::{
    config::DispatchConfig,
    snapshot::{Snapshot, SnapshotPool},
};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tidings_core::Subscription;

struct Entry<T> {
    id: u64,
    item: T,
}

struct State<T> {
    disposed: bool,
    next_id: u64,
    entries: Vec<Entry<T>>,
}

struct Inner<T> {
    state: Mutex<State<T>>,
    pool: SnapshotPool<T>,
}

impl<T> Inner<T> {
    fn remove(&self, id: u64) -> bool {
        let mut state = self.state.lock();
        match state.entries.iter().position(|e| e.id == id) {
            Some(index) => {
                state.entries.remove(index);
                true
            }
            None => false,
        }
    }
}

/// An ordered collection of subscribers, unique per subscription.
pub(crate) struct SubscriberSet<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for SubscriberSet<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> SubscriberSet<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(config: &DispatchConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    disposed: false,
                    next_id: 0,
                    entries: Vec::new(),
                }),
                pool: SnapshotPool::new(config.pool_size, config.max_pooled_len),
            }),
        }
    }

    /// Appends `item`. Hands it back if the set is already disposed.
    pub(crate) fn insert(&self, item: T) -> Result<Subscription, T> {
        let id = {
            let mut state = self.inner.state.lock();
            if state.disposed {
                return Err(item);
            }
            let id = state.next_id;
            state.next_id += 1;
            state.entries.push(Entry { id, item });
            id
        };
        tracing::trace!(id, "subscribed");

        let weak: Weak<Inner<T>> = Arc::downgrade(&self.inner);
        Ok(Subscription::new(move || {
            if let Some(inner) = weak.upgrade()
                && inner.remove(id)
            {
                tracing::trace!(id, "unsubscribed");
            }
        }))
    }

    /// Copies the current entries, or returns `None` when there is nothing to
    /// deliver to.
    pub(crate) fn snapshot(&self) -> Option<Snapshot<'_, T>> {
        let state = self.inner.state.lock();
        if state.disposed || state.entries.is_empty() {
            return None;
        }
        // Lock order is always state, then pool.
        let snapshot = self
            .inner
            .pool
            .snapshot(state.entries.iter().map(|e| e.item.clone()));
        drop(state);
        Some(snapshot)
    }

    /// Flips the set to disposed and drains it. Only the first call gets the
    /// drained items.
    pub(crate) fn dispose(&self) -> Option<Vec<T>> {
        let mut state = self.inner.state.lock();
        if state.disposed {
            return None;
        }
        state.disposed = true;
        let drained = std::mem::take(&mut state.entries);
        Some(drained.into_iter().map(|e| e.item).collect())
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.state.lock().entries.len()
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.inner.state.lock().disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> SubscriberSet<u32> {
        SubscriberSet::new(&DispatchConfig::default())
    }

    #[test]
    fn test_insert_and_remove_by_token() {
        let set = set();
        let a = set.insert(1).unwrap();
        let _b = set.insert(1).unwrap();
        assert_eq!(set.len(), 2);

        a.dispose();
        a.dispose();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_snapshot_isolated_from_mutation() {
        let set = set();
        let first = set.insert(1).unwrap();
        set.insert(2).unwrap();

        let snapshot = set.snapshot().unwrap();
        first.dispose();
        set.insert(3).unwrap();

        assert_eq!(snapshot.as_slice(), &[1, 2]);
        drop(snapshot);
        assert_eq!(set.snapshot().unwrap().as_slice(), &[2, 3]);
    }

    #[test]
    fn test_empty_snapshot_is_none() {
        assert!(set().snapshot().is_none());
    }

    #[test]
    fn test_dispose_drains_once() {
        let set = set();
        set.insert(7).unwrap();
        assert_eq!(set.dispose(), Some(vec![7]));
        assert_eq!(set.dispose(), None);
        assert!(set.is_disposed());
        assert_eq!(set.insert(8).unwrap_err(), 8);
        assert!(set.snapshot().is_none());
    }

    #[test]
    fn test_token_outliving_set() {
        let token = {
            let set = set();
            set.insert(1).unwrap()
        };
        token.dispose();
    }
}
