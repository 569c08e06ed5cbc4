//! Message trait for published types.

/// A marker trait for values that can be published through a dispatcher.
///
/// Messages must be `Send + Sync + 'static` so that a dispatcher can be shared
/// between threads. Every such type is a message; handlers receive them by
/// reference.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Message",
    label = "must be `Send + Sync + 'static`",
    note = "All messages in Tidings must be thread-safe and static."
)]
pub trait Message: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Message for T {}
