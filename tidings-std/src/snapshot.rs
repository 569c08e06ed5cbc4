//! Pooled point-in-time copies of a subscriber set.
//!
//! A publish never iterates the live subscriber list. It copies the handler
//! references into a buffer rented from a [`SnapshotPool`] and walks the copy,
//! so handlers may subscribe or unsubscribe freely while a publish is running.
//! The buffer goes back to the pool when the [`Snapshot`] is released.

use parking_lot::Mutex;
use std::{fmt, ops::Deref};

/// A bounded pool of reusable buffers.
pub struct SnapshotPool<T> {
    buffers: Mutex<Vec<Vec<T>>>,
    capacity: usize,
    max_len: usize,
}

impl<T> SnapshotPool<T> {
    /// Creates a pool retaining at most `capacity` idle buffers whose own
    /// capacity does not exceed `max_len`.
    pub fn new(capacity: usize, max_len: usize) -> Self {
        Self {
            buffers: Mutex::new(Vec::new()),
            capacity,
            max_len,
        }
    }

    /// Number of idle buffers.
    pub fn idle(&self) -> usize {
        self.buffers.lock().len()
    }

    /// Takes an empty buffer out of the pool, or allocates one.
    fn rent(&self) -> Vec<T> {
        self.buffers.lock().pop().unwrap_or_default()
    }


    fn give_back(&self, mut buffer: Vec<T>) {
        buffer.clear();
        if buffer.capacity() == 0 || buffer.capacity() > self.max_len {
            return;
        }
        let mut buffers = self.buffers.lock();
        if buffers.len() < self.capacity {
            buffers.push(buffer);
        }
    }
}

impl<T> SnapshotPool<T> {
    /// Collects `items` into a pooled snapshot.
    pub fn snapshot(&self, items: impl IntoIterator<Item = T>) -> Snapshot<'_, T> {
        let mut buffer = self.rent();
        buffer.extend(items);
        Snapshot {
            items: buffer,
            pool: Some(self),
        }
    }
}

impl<T> fmt::Debug for SnapshotPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotPool")
            .field("idle", &self.idle())
            .field("capacity", &self.capacity)
            .field("max_len", &self.max_len)
            .finish()
    }
}

/// An immutable view of the handlers present when a publish started.
///
/// The view is released exactly once: explicitly through
/// [`release`](Snapshot::release) or implicitly on drop. After release it is
/// empty.
pub struct Snapshot<'a, T> {
    items: Vec<T>,
    pool: Option<&'a SnapshotPool<T>>,
}

impl<'a, T> Snapshot<'a, T> {
    /// A snapshot that owns its buffer and belongs to no pool.
    pub fn detached(items: Vec<T>) -> Self {
        Self { items, pool: None }
    }

    /// The handlers in snapshot order.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Returns the buffer to its pool and empties the view.
    ///
    /// Calling this more than once has no further effect.
    pub fn release(&mut self) {
        let items = std::mem::take(&mut self.items);
        match self.pool.take() {
            Some(pool) => pool.give_back(items),
            None => drop(items),
        }
    }
}

impl<T> Deref for Snapshot<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> Drop for Snapshot<'_, T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T: fmt::Debug> fmt::Debug for Snapshot<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_copies_source() {
        let pool = SnapshotPool::new(2, 64);
        let mut source = vec![1, 2, 3];
        let snapshot = pool.snapshot(source.iter().copied());
        source.push(4);
        assert_eq!(snapshot.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_release_returns_buffer_once() {
        let pool = SnapshotPool::new(2, 64);
        let mut snapshot = pool.snapshot([1, 2, 3]);
        assert_eq!(pool.idle(), 0);

        snapshot.release();
        assert!(snapshot.is_empty());
        assert_eq!(pool.idle(), 1);

        snapshot.release();
        drop(snapshot);
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_buffers_are_reused() {
        let pool = SnapshotPool::new(1, 64);
        let first = pool.snapshot([1, 2, 3, 4]);
        let capacity = first.as_slice().len();
        drop(first);

        let reused = pool.rent();
        assert!(reused.is_empty());
        assert!(reused.capacity() >= capacity);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_pool_bounds() {
        let pool = SnapshotPool::new(1, 4);
        let a = pool.snapshot([1]);
        let b = pool.snapshot([2]);
        drop(a);
        drop(b);
        assert_eq!(pool.idle(), 1);

        let oversized = pool.snapshot([0; 16]);
        let _ = pool.rent();
        drop(oversized);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_detached_snapshot() {
        let mut snapshot = Snapshot::detached(vec!["a", "b"]);
        assert_eq!(snapshot.len(), 2);
        snapshot.release();
        assert!(snapshot.is_empty());
    }
}
