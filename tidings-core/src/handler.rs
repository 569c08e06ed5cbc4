//! # Handlers
//!
//! Handlers are the terminal endpoints of a dispatcher: the code that runs for
//! every published message. Two capabilities exist:
//!
//! - [`Handler`] receives a message and reports success or failure.
//! - [`FuncHandler`] computes a [`FuncResult`] from an argument; the function
//!   dispatcher aggregates many of these into one value.
//!
//! Both carry their own *error channel* (`on_error`) and a *completion*
//! notification (`on_completed`) that fires exactly once when the dispatcher
//! they are subscribed to is disposed.
//!
//! # Usage Patterns
//!
//! 1. **Direct closure**: `|msg: &Tick| { ...; Ok::<_, BoxError>(()) }` or
//!    `|msg: &Tick| println!("{msg:?}")`
//! 2. **Struct implementation**: `impl Handler<Tick> for MyHandler`
//! 3. **Closure with channels**: `FnHandler::new(f).with_error(g).with_completed(h)`

use crate::{error::BoxError, message::Message, result::FuncResult};

/// A receiver of published messages.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot handle messages of type `{M}`",
    label = "missing `Handler<{M}>` implementation",
    note = "Handlers must implement the `handle` method for the message type `{M}`."
)]
pub trait Handler<M: Message>: Send + Sync + 'static {
    /// Processes one published message.
    fn handle(&self, message: &M) -> Result<(), BoxError>;

    /// Receives failures raised by [`handle`](Handler::handle).
    ///
    /// The default implementation logs the error.
    fn on_error(&self, error: BoxError) {
        tracing::warn!(%error, "handler failed and has no error channel");
    }

    /// Called once when the dispatcher this handler is subscribed to is disposed.
    fn on_completed(&self) {}
}

/// A handler that computes a value for each published argument.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot compute `{R}` from `{A}`",
    label = "missing `FuncHandler<{A}, {R}>` implementation",
    note = "Function handlers must implement `call` returning a `FuncResult<{R}>`."
)]
pub trait FuncHandler<A: Message, R: Message>: Send + Sync + 'static {
    /// Computes the result for `arg`.
    ///
    /// `Ok(FuncResult::Failure(..))` signals a handled failure; `Err` is an
    /// invocation failure and is routed to [`on_error`](FuncHandler::on_error).
    fn call(&self, arg: &A) -> Result<FuncResult<R>, BoxError>;

    /// Receives failures raised by [`call`](FuncHandler::call).
    fn on_error(&self, error: BoxError) {
        tracing::warn!(%error, "function handler failed and has no error channel");
    }

    /// Called once when the dispatcher this handler is subscribed to is disposed.
    fn on_completed(&self) {}
}

/// Conversion of a closure's return value into a handler outcome.
///
/// # Default Implementations
///
/// - `()` → success
/// - `Result<(), E>` → success or the boxed error
pub trait IntoOutcome {
    /// Converts into the outcome of one handler invocation.
    fn into_outcome(self) -> Result<(), BoxError>;
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E> IntoOutcome for Result<(), E>
where
    E: Into<BoxError>,
{
    fn into_outcome(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}

/// Conversion of a closure's return value into a function handler result.
pub trait IntoFuncResult<R> {
    /// Converts into the result of one function handler invocation.
    fn into_func_result(self) -> Result<FuncResult<R>, BoxError>;
}

impl<R> IntoFuncResult<R> for FuncResult<R> {
    fn into_func_result(self) -> Result<FuncResult<R>, BoxError> {
        Ok(self)
    }
}

impl<R, E> IntoFuncResult<R> for Result<FuncResult<R>, E>
where
    E: Into<BoxError>,
{
    fn into_func_result(self) -> Result<FuncResult<R>, BoxError> {
        self.map_err(Into::into)
    }
}

// Blanket impl for closures
impl<M, F, O> Handler<M> for F
where
    M: Message,
    O: IntoOutcome,
    F: Fn(&M) -> O + Send + Sync + 'static,
{
    fn handle(&self, message: &M) -> Result<(), BoxError> {
        (self)(message).into_outcome()
    }
}

impl<A, R, F, O> FuncHandler<A, R> for F
where
    A: Message,
    R: Message,
    O: IntoFuncResult<R>,
    F: Fn(&A) -> O + Send + Sync + 'static,
{
    fn call(&self, arg: &A) -> Result<FuncResult<R>, BoxError> {
        (self)(arg).into_func_result()
    }
}

type ErrorCallback = Box<dyn Fn(BoxError) + Send + Sync>;
type CompletedCallback = Box<dyn Fn() + Send + Sync>;

/// A closure handler with optional error and completion callbacks.
///
/// # Example
///
/// ```rust,ignore
/// let handler = FnHandler::new(|tick: &Tick| println!("{tick:?}"))
///     .with_error(|e| eprintln!("failed: {e}"))
///     .with_completed(|| println!("done"));
/// dispatcher.subscribe(handler);
/// ```
pub struct FnHandler<F> {
    handle: F,
    error: Option<ErrorCallback>,
    completed: Option<CompletedCallback>,
}

impl<F> FnHandler<F> {
    /// Wraps `handle` with no error or completion callbacks.
    pub fn new(handle: F) -> Self {
        Self {
            handle,
            error: None,
            completed: None,
        }
    }

    /// Sets the error channel.
    pub fn with_error(mut self, error: impl Fn(BoxError) + Send + Sync + 'static) -> Self {
        self.error = Some(Box::new(error));
        self
    }

    /// Sets the completion callback.
    pub fn with_completed(mut self, completed: impl Fn() + Send + Sync + 'static) -> Self {
        self.completed = Some(Box::new(completed));
        self
    }
}

impl<M, F, O> Handler<M> for FnHandler<F>
where
    M: Message,
    O: IntoOutcome,
    F: Fn(&M) -> O + Send + Sync + 'static,
{
    fn handle(&self, message: &M) -> Result<(), BoxError> {
        (self.handle)(message).into_outcome()
    }

    fn on_error(&self, error: BoxError) {
        match &self.error {
            Some(callback) => callback(error),
            None => tracing::warn!(%error, "handler failed and has no error channel"),
        }
    }

    fn on_completed(&self) {
        if let Some(callback) = &self.completed {
            callback();
        }
    }
}
