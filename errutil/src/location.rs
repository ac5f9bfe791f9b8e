//! Call-site file/line decoration.
//!
//! [`error_with_file_line`] captures the location of its caller through
//! `#[track_caller]`. To attribute a frame further up, mark the helper
//! functions in between with `#[track_caller]` as well: each marked layer
//! hands the location of its own caller down.
//!
//! ```rust
//! use errutil::{error_with_file_line, FileLineError, Message};
//!
//! #[track_caller]
//! fn invalid(what: &str) -> FileLineError {
//!     error_with_file_line(Message::new(format!("invalid {what}")))
//! }
//!
//! let line = line!() + 1;
//! let err = invalid("axis");
//! assert_eq!(err.line(), line);
//! assert!(err.to_string().ends_with(&format!(":{line}: invalid axis")));
//! ```

use std::borrow::Cow;
use std::fmt;
use std::panic::Location;

use thiserror::Error;
use tracing::warn;

use crate::BoxError;

/// File marker used when no location is known.
pub const UNKNOWN_FILE: &str = "???";

/// A source file and line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    file: Cow<'static, str>,
    line: u32,
    known: bool,
}

impl SourceLocation {
    /// Location of the caller.
    #[track_caller]
    pub fn caller() -> Self {
        Location::caller().into()
    }

    /// Location given explicitly.
    pub fn new(file: impl Into<Cow<'static, str>>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
            known: true,
        }
    }

    /// The `???:0` marker.
    pub const fn unknown() -> Self {
        Self {
            file: Cow::Borrowed(UNKNOWN_FILE),
            line: 0,
            known: false,
        }
    }

    /// Location from optional parts; anything missing gives [`unknown`](Self::unknown).
    pub fn from_parts(file: Option<&str>, line: Option<u32>) -> Self {
        match (file, line) {
            (Some(file), Some(line)) if !file.is_empty() => Self::new(file.to_owned(), line),
            _ => {
                warn!(?file, ?line, "source location unavailable");
                Self::unknown()
            }
        }
    }

    /// Source file path.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Line number, `0` when unknown.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Returns true for the [`unknown`](Self::unknown) marker. An explicit
    /// location on line `0` is still known.
    pub fn is_unknown(&self) -> bool {
        !self.known
    }

    pub(crate) fn with_file(self, file: Cow<'static, str>) -> Self {
        Self { file, ..self }
    }
}

impl From<&'static Location<'static>> for SourceLocation {
    fn from(location: &'static Location<'static>) -> Self {
        Self::new(location.file(), location.line())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// An error prefixed with the location that produced it.
///
/// Renders as `<file>:<line>: <message>`; the wrapped error is the
/// `source()`.
#[derive(Debug, Error)]
#[error("{location}: {source}")]
pub struct FileLineError {
    location: SourceLocation,
    #[source]
    source: BoxError,
}

impl FileLineError {
    /// Decorate `err` with an explicit location.
    pub fn new(err: impl Into<BoxError>, location: SourceLocation) -> Self {
        Self {
            location,
            source: err.into(),
        }
    }

    /// Where the error was decorated.
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// Source file of the decoration.
    pub fn file(&self) -> &str {
        self.location.file()
    }

    /// Line of the decoration.
    pub fn line(&self) -> u32 {
        self.location.line()
    }

    /// Drop the decoration and return the original error.
    pub fn into_inner(self) -> BoxError {
        self.source
    }
}

/// Decorate `err` with the file and line of the caller.
#[track_caller]
pub fn error_with_file_line(err: impl Into<BoxError>) -> FileLineError {
    FileLineError::new(err, SourceLocation::caller())
}

/// Decorate `err` with a location obtained elsewhere.
pub fn error_at(err: impl Into<BoxError>, location: SourceLocation) -> FileLineError {
    FileLineError::new(err, location)
}
