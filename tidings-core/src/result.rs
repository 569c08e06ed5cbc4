//! Function handler results and how they are aggregated.

use bitflags::bitflags;

/// The success-or-failure tagged value returned by a [`FuncHandler`].
///
/// `Failure(None)` is the "no result" value: a handler that failed without
/// data, an invocation error, or a publish with nobody subscribed.
///
/// [`FuncHandler`]: crate::FuncHandler
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuncResult<R> {
    /// The handler succeeded.
    Success(R),
    /// The handler signaled failure, optionally carrying a value.
    Failure(Option<R>),
}

impl<R> FuncResult<R> {
    /// The empty failure.
    pub const fn none() -> Self {
        FuncResult::Failure(None)
    }

    /// Returns `true` for [`FuncResult::Success`].
    pub const fn is_success(&self) -> bool {
        matches!(self, FuncResult::Success(_))
    }

    /// Returns `true` for [`FuncResult::Failure`].
    pub const fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// The carried value, whether the result is a success or a failure.
    pub fn value(&self) -> Option<&R> {
        match self {
            FuncResult::Success(value) => Some(value),
            FuncResult::Failure(value) => value.as_ref(),
        }
    }

    /// Consumes the result, keeping the value only on success.
    pub fn success(self) -> Option<R> {
        match self {
            FuncResult::Success(value) => Some(value),
            FuncResult::Failure(_) => None,
        }
    }

    /// Consumes the result, keeping any carried value.
    pub fn into_value(self) -> Option<R> {
        match self {
            FuncResult::Success(value) => Some(value),
            FuncResult::Failure(value) => value,
        }
    }

    /// Maps the carried value, preserving the tag.
    pub fn map<U>(self, f: impl FnOnce(R) -> U) -> FuncResult<U> {
        match self {
            FuncResult::Success(value) => FuncResult::Success(f(value)),
            FuncResult::Failure(value) => FuncResult::Failure(value.map(f)),
        }
    }
}

impl<R> Default for FuncResult<R> {
    fn default() -> Self {
        Self::none()
    }
}

impl<R> From<Option<R>> for FuncResult<R> {
    fn from(value: Option<R>) -> Self {
        match value {
            Some(value) => FuncResult::Success(value),
            None => FuncResult::none(),
        }
    }
}

/// How the results of many function handlers reduce to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Aggregation {
    /// First handler's result; every handler still runs.
    ReturnFirst,
    /// First handler's result; no other handler runs.
    ReturnFirstAndStop,
    /// First successful result; every handler still runs.
    ReturnFirstSuccess,
    /// First successful result; handlers after it do not run.
    ReturnFirstSuccessAndStop,
    /// Last handler's result.
    #[default]
    ReturnLast,
    /// Last successful result.
    ReturnLastSuccess,
}

impl Aggregation {
    /// Returns `true` if the policy can end a publish before every handler ran.
    pub const fn stops_early(self) -> bool {
        matches!(
            self,
            Aggregation::ReturnFirstAndStop | Aggregation::ReturnFirstSuccessAndStop
        )
    }
}

bitflags! {
    /// Options for lazily enumerating handler results.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PublishFlags: u8 {
        /// Leave failed results out of the sequence. Handlers still run.
        const SKIP_FAILURES = 1;
    }
}
