//! Condition-gated panics and their recovery.
//!
//! [`panic`] and [`panicf!`](crate::panicf!) bind an error to a
//! [`ConditionalPanic`]; nothing happens until [`ConditionalPanic::when`]
//! is called with `true`, which unwinds with the bound error as the panic
//! payload. [`catch`] and [`recover`] turn the unwinding payload back into
//! an ordinary [`CausedError`].
//!
//! ```rust
//! use errutil::{catch, panic, Message};
//!
//! // A false condition is a no-op.
//! panic(Message::new("unreachable")).when(false);
//!
//! let err = catch(|| panic(Message::new("reason: panic")).when(true)).unwrap_err();
//! assert_eq!(
//!     err.cause().downcast_error_ref::<Message>(),
//!     Some(&Message::new("reason: panic"))
//! );
//! ```
//!
//! Unwinding never leaves the thread that raised it. A panic in a spawned
//! thread surfaces through that thread's `JoinHandle`, not through a
//! `catch` running elsewhere.

use std::any::Any;
use std::fmt;
use std::panic::{self as unwind, AssertUnwindSafe};

use thiserror::Error;
use tracing::{error, trace};

use crate::BoxError;
use crate::cause::{Cause, CausedError, with_cause};

/// A plain text error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct Message(String);

impl Message {
    /// Create an error with the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The error text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A panic waiting for its condition.
///
/// Consumed by [`when`](Self::when).
#[derive(Debug)]
#[must_use = "a conditional panic does nothing until `when` is called"]
pub struct ConditionalPanic {
    error: BoxError,
}

impl ConditionalPanic {
    /// The bound error.
    pub fn error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.error.as_ref()
    }

    /// Unwind with the bound error if `condition` holds.
    ///
    /// The panic payload is the bound [`BoxError`]; the panic location is
    /// the caller of `when`. The error text is logged at `error` level
    /// first: if nothing catches the unwind, the default panic hook only
    /// prints `Box<dyn Any>` for a non-string payload.
    #[track_caller]
    pub fn when(self, condition: bool) {
        if condition {
            let location = std::panic::Location::caller();
            error!(error = %self.error, %location, "conditional panic triggered");
            unwind::panic_any(self.error);
        }
    }
}

/// Bind `err` to a conditional panic.
pub fn panic(err: impl Into<BoxError>) -> ConditionalPanic {
    ConditionalPanic { error: err.into() }
}

/// Bind a formatted [`Message`] to a conditional panic.
///
/// Usually reached through [`panicf!`](crate::panicf!).
pub fn panicf(args: fmt::Arguments<'_>) -> ConditionalPanic {
    panic(Message::new(args.to_string()))
}

/// Build a [`ConditionalPanic`] from a format string.
///
/// ```rust
/// let pending = errutil::panicf!("axis {} out of range", 3);
/// assert_eq!(pending.error().to_string(), "axis 3 out of range");
/// pending.when(false);
/// ```
#[macro_export]
macro_rules! panicf {
    ($($arg:tt)*) => {
        $crate::conditional::panicf(::std::format_args!($($arg)*))
    };
}

/// Turn an unwinding payload back into an error.
pub fn recover(payload: Box<dyn Any + Send>) -> CausedError {
    let cause = Cause::from_panic_payload(payload);
    trace!(kind = cause.kind(), "recovered panic payload");
    with_cause(cause)
}

/// Run `f`, converting a panic into an error.
///
/// `f` is treated as unwind safe: after a panic the caller only sees the
/// returned error, never state `f` left half-updated.
pub fn catch<F, R>(f: F) -> Result<R, CausedError>
where
    F: FnOnce() -> R,
{
    unwind::catch_unwind(AssertUnwindSafe(f)).map_err(recover)
}
