//! Dispatcher seam traits.
//!
//! Every message dispatcher implements [`Subscribe`], [`Publish`] and
//! [`Dispose`]. Forwarding links between dispatchers are expressed through
//! `Arc<dyn Subscribe<M>>`, so any implementation can be a successor.

use crate::{handler::Handler, message::Message, subscription::Subscription};
use std::sync::Arc;

/// Something handlers can be registered with.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not accept subscriptions for `{M}`",
    label = "missing `Subscribe<{M}>` implementation",
    note = "Implement `Subscribe<{M}>` to register handlers."
)]
pub trait Subscribe<M: Message>: Send + Sync {
    /// Registers a shared handler.
    ///
    /// The same `Arc` may be registered more than once; each registration is
    /// independent and gets its own token.
    fn subscribe_shared(&self, handler: Arc<dyn Handler<M>>) -> Subscription;

    /// Registers a handler.
    fn subscribe<H>(&self, handler: H) -> Subscription
    where
        Self: Sized,
        H: Handler<M>,
    {
        self.subscribe_shared(Arc::new(handler))
    }
}

/// Something messages can be published to.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot publish messages of type `{M}`",
    label = "missing `Publish<{M}>` implementation",
    note = "Implement `Publish<{M}>` to deliver messages to handlers."
)]
pub trait Publish<M: Message>: Send + Sync {
    /// Delivers `message` to every current handler.
    fn publish(&self, message: &M);
}

/// Explicit end of life.
///
/// Disposal is idempotent and never fails.
pub trait Dispose: Send + Sync {
    /// Disposes the dispatcher, notifying handlers of completion.
    fn dispose(&self);

    /// Returns `true` once [`dispose`](Dispose::dispose) has been called.
    fn is_disposed(&self) -> bool;
}

impl<M: Message, T: Subscribe<M> + ?Sized> Subscribe<M> for Arc<T> {
    fn subscribe_shared(&self, handler: Arc<dyn Handler<M>>) -> Subscription {
        (**self).subscribe_shared(handler)
    }
}

impl<M: Message, T: Publish<M> + ?Sized> Publish<M> for Arc<T> {
    fn publish(&self, message: &M) {
        (**self).publish(message)
    }
}
