#![allow(dead_code)]

use parking_lot::Mutex;
use std::sync::Arc;
use tidings::{BoxError, Handler};

// ============================================================================
// Test Message Types
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct Quote {
    pub symbol: &'static str,
    pub price: u32,
}

impl Quote {
    pub fn new(symbol: &'static str, price: u32) -> Self {
        Self { symbol, price }
    }
}

// ============================================================================
// Test Handlers
// ============================================================================

/// An error carrying the id of the handler that raised it.
#[derive(Debug, thiserror::Error)]
#[error("handler {id} failed")]
pub struct TaggedError {
    pub id: usize,
}

/// Records deliveries and fails every time when `fail` is set.
pub struct TaggedHandler {
    pub id: usize,
    pub fail: bool,
    pub seen: Mutex<Vec<u32>>,
    pub errors: Mutex<Vec<usize>>,
}

impl TaggedHandler {
    pub fn new(id: usize, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            id,
            fail,
            seen: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
        })
    }
}

impl Handler<u32> for TaggedHandler {
    fn handle(&self, message: &u32) -> Result<(), BoxError> {
        self.seen.lock().push(*message);
        if self.fail {
            return Err(Box::new(TaggedError { id: self.id }));
        }
        Ok(())
    }

    fn on_error(&self, error: BoxError) {
        let id = error
            .downcast_ref::<TaggedError>()
            .map_or(usize::MAX, |e| e.id);
        self.errors.lock().push(id);
    }
}

/// Appends `name` to a shared log on every delivery.
pub fn logging_handler(
    log: &Arc<Mutex<Vec<&'static str>>>,
    name: &'static str,
) -> impl Fn(&Quote) + Send + Sync + 'static {
    let log = log.clone();
    move |_: &Quote| log.lock().push(name)
}
