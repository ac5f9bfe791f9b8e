//! Error annotation utilities.
//!
//! This crate provides small helpers that other crates use to enrich
//! error values without building a full error hierarchy.
//!
//! # Module Structure
//!
//! - [`cause`] - Typed cause payloads attached to errors
//! - [`conditional`] - Condition-gated panics and their recovery
//! - [`location`] - Call-site file/line decoration
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use errutil::{cause, error_with_file_line, with_cause, Message};
//!
//! let err = with_cause("this is a string");
//! assert_eq!(cause(&err).and_then(|c| c.as_str()), Some("this is a string"));
//!
//! let err = error_with_file_line(Message::new("disk full"));
//! assert!(err.to_string().ends_with(": disk full"));
//! ```
//!
//! Conditional panics unwind with the bound error and can be turned back
//! into an ordinary error at a higher frame:
//!
//! ```rust
//! use errutil::{catch, panicf};
//!
//! let result = catch(|| panicf!("reason: {}", "panicf").when(true));
//! let err = result.unwrap_err();
//! assert_eq!(err.to_string(), "reason: panicf");
//! ```

pub mod cause;
pub mod conditional;
pub mod config;
pub mod location;
pub mod prelude;

pub use cause::{Cause, CausedError, OtherPayload, cause, find_cause, with_cause};
pub use conditional::{ConditionalPanic, Message, catch, panic, panicf, recover};
pub use location::{FileLineError, SourceLocation, error_at, error_with_file_line};

/// Boxed, thread-safe error trait object used at every API boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Install a global `tracing` subscriber.
///
/// `RUST_LOG` directives take precedence; `level` is the fallback default.
/// Calling this more than once is harmless, later calls are ignored.
pub fn init_tracing(level: config::LogLevel) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::from(level).into())
        .from_env_lossy();

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
