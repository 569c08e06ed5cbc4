//! Ordered composition of many filters into one.

use std::{fmt, sync::Arc};
use tidings_core::{Filter, Flow, Message, MutatingFilter};

/// Read-only filters applied in order.
///
/// Filters are sorted by [`Filter::order`] once, at construction. The sort is
/// stable, so filters with equal keys keep their relative position. The first
/// filter that blocks ends the evaluation.
pub struct FilterChain<M: Message> {
    filters: Vec<Arc<dyn Filter<M>>>,
}

impl<M: Message> FilterChain<M> {
    /// Sorts and stores `filters`.
    pub fn new(mut filters: Vec<Arc<dyn Filter<M>>>) -> Self {
        filters.sort_by_key(|f| f.order());
        Self { filters }
    }

    /// Number of filters in the chain.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns `true` if the chain holds no filters.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl<M: Message> Filter<M> for FilterChain<M> {
    fn order(&self) -> i32 {
        self.filters.first().map_or(0, |f| f.order())
    }

    fn filter(&self, message: &M) -> Flow {
        for filter in &self.filters {
            if filter.filter(message) == Flow::Block {
                return Flow::Block;
            }
        }
        Flow::Pass
    }
}

impl<M: Message> fmt::Debug for FilterChain<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let orders: Vec<i32> = self.filters.iter().map(|f| f.order()).collect();
        f.debug_struct("FilterChain").field("orders", &orders).finish()
    }
}

/// Mutating filters applied in order, each seeing the previous one's output.
///
/// Mutations made before a filter blocks are kept.
pub struct MutatingChain<M: Message> {
    filters: Vec<Arc<dyn MutatingFilter<M>>>,
}

impl<M: Message> MutatingChain<M> {
    /// Sorts and stores `filters`.
    pub fn new(mut filters: Vec<Arc<dyn MutatingFilter<M>>>) -> Self {
        filters.sort_by_key(|f| f.order());
        Self { filters }
    }

    /// Number of filters in the chain.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns `true` if the chain holds no filters.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl<M: Message> MutatingFilter<M> for MutatingChain<M> {
    fn order(&self) -> i32 {
        self.filters.first().map_or(0, |f| f.order())
    }

    fn filter(&self, message: &mut M) -> Flow {
        for filter in &self.filters {
            if filter.filter(message) == Flow::Block {
                return Flow::Block;
            }
        }
        Flow::Pass
    }
}

/// A shared read-only filter running inside a mutating chain.
///
/// The message is only inspected; the statically typed counterpart is
/// [`Inspect`](tidings_core::Inspect).
pub struct Lifted<M: Message>(Arc<dyn Filter<M>>);

impl<M: Message> MutatingFilter<M> for Lifted<M> {
    fn order(&self) -> i32 {
        self.0.order()
    }

    fn filter(&self, message: &mut M) -> Flow {
        self.0.filter(message)
    }
}

/// Lifts a shared read-only filter into a mutating one.
pub fn lift<M: Message>(filter: Arc<dyn Filter<M>>) -> Arc<dyn MutatingFilter<M>> {
    Arc::new(Lifted(filter))
}

/// Composes read-only filters.
///
/// No filters compose to `None`; a single filter is returned as is; two or
/// more become a [`FilterChain`].
pub fn compose<M: Message>(mut filters: Vec<Arc<dyn Filter<M>>>) -> Option<Arc<dyn Filter<M>>> {
    match filters.len() {
        0 => None,
        1 => filters.pop(),
        _ => Some(Arc::new(FilterChain::new(filters))),
    }
}

/// Composes mutating filters, with the same rules as [`compose`].
pub fn compose_mutating<M: Message>(
    mut filters: Vec<Arc<dyn MutatingFilter<M>>>,
) -> Option<Arc<dyn MutatingFilter<M>>> {
    match filters.len() {
        0 => None,
        1 => filters.pop(),
        _ => Some(Arc::new(MutatingChain::new(filters))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use tidings_core::{filter_fn, mutate_fn};

    fn recording(
        log: &Arc<Mutex<Vec<&'static str>>>,
        name: &'static str,
        order: i32,
        flow: Flow,
    ) -> Arc<dyn Filter<u32>> {
        let log = log.clone();
        Arc::new(filter_fn(order, move |_: &u32| {
            log.lock().push(name);
            flow
        }))
    }

    #[test]
    fn test_stable_sort_by_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = FilterChain::new(vec![
            recording(&log, "b0", 0, Flow::Pass),
            recording(&log, "a-1", -1, Flow::Pass),
            recording(&log, "c0", 0, Flow::Pass),
            recording(&log, "d5", 5, Flow::Pass),
            recording(&log, "e-1", -1, Flow::Pass),
        ]);

        assert_eq!(chain.filter(&1), Flow::Pass);
        assert_eq!(*log.lock(), vec!["a-1", "e-1", "b0", "c0", "d5"]);
        assert_eq!(chain.order(), -1);
    }

    #[test]
    fn test_block_short_circuits() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = FilterChain::new(vec![
            recording(&log, "first", 0, Flow::Pass),
            recording(&log, "blocker", 1, Flow::Block),
            recording(&log, "never", 2, Flow::Pass),
        ]);

        assert_eq!(chain.filter(&1), Flow::Block);
        assert_eq!(*log.lock(), vec!["first", "blocker"]);
    }

    #[test]
    fn test_mutations_accumulate() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let filters: Vec<Arc<dyn MutatingFilter<u32>>> = (0..3)
            .map(|_| {
                let seen = seen.clone();
                Arc::new(mutate_fn(0, move |v: &mut u32| {
                    seen.lock().push(*v);
                    *v += 1;
                    Flow::Pass
                })) as Arc<dyn MutatingFilter<u32>>
            })
            .collect();
        let chain = MutatingChain::new(filters);

        let mut value = 1;
        assert_eq!(chain.filter(&mut value), Flow::Pass);
        assert_eq!(value, 4);
        assert_eq!(*seen.lock(), vec![1, 2, 3]);
    }

    #[test]
    fn test_mutation_kept_when_blocked() {
        let scale: Arc<dyn MutatingFilter<u32>> = Arc::new(mutate_fn(0, |v: &mut u32| {
            *v *= 10;
            Flow::Pass
        }));
        let block: Arc<dyn MutatingFilter<u32>> = Arc::new(mutate_fn(1, |_: &mut u32| Flow::Block));
        let chain = MutatingChain::new(vec![scale, block]);
        let mut value = 2;
        assert_eq!(chain.filter(&mut value), Flow::Block);
        assert_eq!(value, 20);
    }

    #[test]
    fn test_lifted_filter_keeps_order_and_verdict() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let scale: Arc<dyn MutatingFilter<u32>> = Arc::new(mutate_fn(0, |v: &mut u32| {
            *v *= 2;
            Flow::Pass
        }));
        let chain = MutatingChain::new(vec![scale, lift(recording(&log, "gate", -1, Flow::Block))]);

        let mut value = 3;
        assert_eq!(chain.filter(&mut value), Flow::Block);
        assert_eq!(value, 3);
        assert_eq!(*log.lock(), vec!["gate"]);
    }

    #[test]
    fn test_compose_sizes() {
        assert!(compose::<u32>(Vec::new()).is_none());

        let single: Arc<dyn Filter<u32>> = Arc::new(filter_fn(7, |_: &u32| Flow::Pass));
        let composed = compose(vec![single.clone()]).unwrap();
        assert!(Arc::ptr_eq(&composed, &single));

        let many = compose(vec![single.clone(), single]).unwrap();
        assert_eq!(many.order(), 7);
    }
}
