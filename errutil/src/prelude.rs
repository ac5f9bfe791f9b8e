//! Prelude module for common re-exports.
//!
//! ```rust
//! use errutil::prelude::*;
//!
//! let err = with_cause(7);
//! assert_eq!(cause(&err).and_then(Cause::as_int), Some(7));
//! ```

// ─── Causes ─────────────────────────────────────────────────────────
pub use crate::cause::{Cause, CausedError, cause, find_cause, with_cause};

// ─── Conditional panics ─────────────────────────────────────────────
pub use crate::conditional::{ConditionalPanic, Message, catch, panic, recover};
pub use crate::panicf;

// ─── Locations ──────────────────────────────────────────────────────
pub use crate::location::{FileLineError, SourceLocation, error_at, error_with_file_line};

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, ErrutilConfig, LogLevel};

pub use crate::BoxError;
