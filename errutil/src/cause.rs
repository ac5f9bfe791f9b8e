//! Typed cause payloads attached to errors.
//!
//! [`with_cause`] wraps a value into a [`CausedError`] and [`cause`] gets
//! the value back with its original kind. Payloads are modelled as the
//! closed [`Cause`] variant: strings, integers, errors, and an opaque
//! bucket for everything else.
//!
//! ```rust
//! use errutil::{cause, with_cause, Message};
//!
//! let err = with_cause(123456);
//! assert_eq!(cause(&err).and_then(|c| c.as_int()), Some(123456));
//!
//! let err = with_cause(Message::new("this is an error"));
//! assert_eq!(err.to_string(), "this is an error");
//! ```

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use static_assertions::assert_impl_all;
use thiserror::Error;

use crate::BoxError;
use crate::conditional::Message;

/// Rendering used for panic payloads of an unrecognised type.
const OPAQUE_PANIC_PAYLOAD: &str = "Box<dyn Any>";

// ─── Cause ──────────────────────────────────────────────────────────

/// A cause payload, tagged by kind.
pub enum Cause {
    /// Text payload.
    Str(String),
    /// Integer payload. Primitive integers that fit are widened to `i64`;
    /// wider values that don't fit become [`Cause::Other`].
    Int(i64),
    /// Error payload. The concrete type survives and can be downcast.
    Error(BoxError),
    /// Any other value.
    Other(OtherPayload),
}

impl Cause {
    /// Wrap an arbitrary error value.
    pub fn error<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Error(Box::new(err))
    }

    /// Wrap a value that is neither text, an integer nor an error.
    ///
    /// The `Debug` rendering is captured now and becomes the error message.
    pub fn other<T>(value: T) -> Self
    where
        T: Any + Send + fmt::Debug,
    {
        let rendered = format!("{value:?}");
        Self::Other(OtherPayload::new(rendered, Box::new(value)))
    }

    /// Rebuild a cause from an unwinding payload.
    ///
    /// Errors raised by [`ConditionalPanic::when`](crate::ConditionalPanic::when)
    /// come back as [`Cause::Error`], `panic!` messages as [`Cause::Str`],
    /// `panic_any` integers as [`Cause::Int`].
    ///
    /// Only [`BoxError`], [`Message`] and [`CausedError`] payloads keep their
    /// error identity. Any other concrete error passed to `panic_any`, such as
    /// `std::io::Error`, is indistinguishable from an arbitrary value here and
    /// becomes [`Cause::Other`] rendered as `Box<dyn Any>`; box it first to
    /// keep it an error.
    pub fn from_panic_payload(payload: Box<dyn Any + Send>) -> Self {
        let payload = match payload.downcast::<BoxError>() {
            Ok(err) => return Self::Error(*err),
            Err(payload) => payload,
        };
        let payload = match payload.downcast::<Cause>() {
            Ok(cause) => return *cause,
            Err(payload) => payload,
        };
        let payload = match payload.downcast::<CausedError>() {
            Ok(err) => return Self::Error(err),
            Err(payload) => payload,
        };
        let payload = match payload.downcast::<Message>() {
            Ok(msg) => return Self::Error(msg),
            Err(payload) => payload,
        };
        let payload = match payload.downcast::<String>() {
            Ok(text) => return Self::Str(*text),
            Err(payload) => payload,
        };
        if let Some(text) = payload.downcast_ref::<&'static str>() {
            return Self::Str((*text).to_owned());
        }
        if let Some(cause) = downcast_int(payload.as_ref()) {
            return cause;
        }
        Self::Other(OtherPayload::new(OPAQUE_PANIC_PAYLOAD.to_owned(), payload))
    }

    /// Short name of the payload kind, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Str(_) => "str",
            Self::Int(_) => "int",
            Self::Error(_) => "error",
            Self::Other(_) => "other",
        }
    }

    /// Text payload, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(text) => Some(text),
            _ => None,
        }
    }

    /// Integer payload, if this is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Error payload, if this is one.
    pub fn as_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            Self::Error(err) => Some(err.as_ref()),
            _ => None,
        }
    }

    /// Error payload downcast to its concrete type.
    pub fn downcast_error_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.as_error().and_then(|err| err.downcast_ref::<E>())
    }

    /// Opaque payload, if this is one.
    pub fn as_other(&self) -> Option<&OtherPayload> {
        match self {
            Self::Other(other) => Some(other),
            _ => None,
        }
    }
}

fn downcast_int(value: &(dyn Any + Send)) -> Option<Cause> {
    macro_rules! try_int {
        ($($ty:ty),*) => {
            $(
                if let Some(v) = value.downcast_ref::<$ty>() {
                    return Some(int_or_other(*v));
                }
            )*
        };
    }
    try_int!(i32, i64, isize, usize, u64, i8, i16, u8, u16, u32, i128, u128);
    None
}

/// `Int` if `value` fits in `i64`, otherwise `Other` rendered with `Display`.
fn int_or_other<T>(value: T) -> Cause
where
    T: Copy + fmt::Display + Any + Send,
    i64: TryFrom<T>,
{
    match i64::try_from(value) {
        Ok(v) => Cause::Int(v),
        Err(_) => Cause::Other(OtherPayload::new(value.to_string(), Box::new(value))),
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(text) => f.write_str(text),
            Self::Int(value) => write!(f, "{value}"),
            Self::Error(err) => write!(f, "{err}"),
            Self::Other(other) => f.write_str(other.rendered()),
        }
    }
}

impl fmt::Debug for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(text) => f.debug_tuple("Str").field(text).finish(),
            Self::Int(value) => f.debug_tuple("Int").field(value).finish(),
            Self::Error(err) => f.debug_tuple("Error").field(err).finish(),
            Self::Other(other) => f.debug_tuple("Other").field(other).finish(),
        }
    }
}

impl PartialEq<&str> for Cause {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

impl PartialEq<i64> for Cause {
    fn eq(&self, other: &i64) -> bool {
        self.as_int() == Some(*other)
    }
}

impl From<&str> for Cause {
    fn from(text: &str) -> Self {
        Self::Str(text.to_owned())
    }
}

impl From<String> for Cause {
    fn from(text: String) -> Self {
        Self::Str(text)
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Cause {
                fn from(value: $ty) -> Self {
                    int_or_other(value)
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, i128, u128);

impl From<BoxError> for Cause {
    fn from(err: BoxError) -> Self {
        Self::Error(err)
    }
}

impl From<Message> for Cause {
    fn from(msg: Message) -> Self {
        Self::error(msg)
    }
}

impl From<CausedError> for Cause {
    fn from(err: CausedError) -> Self {
        Self::error(err)
    }
}

// ─── Opaque payload ─────────────────────────────────────────────────

/// A payload of any other type.
///
/// The value sits behind a mutex so that a `Send`-only value can still be
/// shared; the lock is only taken by the accessors below.
pub struct OtherPayload {
    rendered: String,
    value: Mutex<Box<dyn Any + Send>>,
}

impl OtherPayload {
    fn new(rendered: String, value: Box<dyn Any + Send>) -> Self {
        Self {
            rendered,
            value: Mutex::new(value),
        }
    }

    /// Text captured when the payload was created.
    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    /// Returns true if the payload is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is::<T>()
    }

    /// Clone the payload out as a `T`.
    pub fn downcast_cloned<T: Any + Clone>(&self) -> Option<T> {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .downcast_ref::<T>()
            .cloned()
    }

    /// Take the payload back.
    pub fn into_inner(self) -> Box<dyn Any + Send> {
        self.value
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for OtherPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OtherPayload")
            .field("rendered", &self.rendered)
            .finish_non_exhaustive()
    }
}

// ─── CausedError ────────────────────────────────────────────────────

/// An error that carries a [`Cause`].
///
/// The message is rendered once, when the error is created. For an error
/// payload it is exactly the payload's own message.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CausedError {
    message: String,
    cause: Cause,
}

assert_impl_all!(CausedError: Send, Sync);
assert_impl_all!(Cause: Send, Sync);

impl CausedError {
    /// The attached payload.
    pub fn cause(&self) -> &Cause {
        &self.cause
    }

    /// Consume the error and return the payload.
    pub fn into_cause(self) -> Cause {
        self.cause
    }
}

/// Wrap `payload` into an error.
pub fn with_cause(payload: impl Into<Cause>) -> CausedError {
    let cause = payload.into();
    CausedError {
        message: cause.to_string(),
        cause,
    }
}

/// Payload of `err` if it was built by [`with_cause`].
///
/// Any other error has no recoverable cause and yields `None`; wrappers are
/// not looked through (see [`find_cause`]).
pub fn cause<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a Cause> {
    err.downcast_ref::<CausedError>().map(CausedError::cause)
}

/// Payload of the first [`CausedError`] in the `source()` chain of `err`,
/// starting with `err` itself.
pub fn find_cause<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a Cause> {
    let mut current = Some(err);
    while let Some(err) = current {
        if let Some(found) = cause(err) {
            return Some(found);
        }
        current = err.source();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_string_payload_roundtrip() {
        let err = with_cause("this is a string");
        assert_eq!(err.to_string(), "this is a string");
        assert_eq!(cause(&err).and_then(Cause::as_str), Some("this is a string"));
    }

    #[test]
    fn test_integer_payload_is_widened() {
        let err = with_cause(7u8);
        assert_eq!(err.cause().as_int(), Some(7));
        assert_eq!(err.to_string(), "7");
    }

    #[test]
    fn test_error_payload_keeps_message_and_type() {
        let err = with_cause(Cause::error(io::Error::other("boom")));
        assert_eq!(err.to_string(), "boom");

        let inner = err.cause().downcast_error_ref::<io::Error>().unwrap();
        assert_eq!(inner.kind(), io::ErrorKind::Other);
    }

    #[test]
    fn test_other_payload_renders_debug() {
        #[derive(Debug, Clone, PartialEq)]
        struct Point {
            x: i32,
            y: i32,
        }

        let err = with_cause(Cause::other(Point { x: 1, y: 2 }));
        assert_eq!(err.to_string(), "Point { x: 1, y: 2 }");

        let other = err.cause().as_other().unwrap();
        assert!(other.is::<Point>());
        assert_eq!(other.downcast_cloned::<Point>(), Some(Point { x: 1, y: 2 }));
    }

    #[test]
    fn test_cause_of_foreign_error_is_none() {
        let err = io::Error::other("plain");
        assert!(cause(&err).is_none());
        assert!(find_cause(&err).is_none());
    }

    #[test]
    fn test_panic_payload_kinds() {
        assert_eq!(Cause::from_panic_payload(Box::new("static")), "static");
        assert_eq!(
            Cause::from_panic_payload(Box::new(String::from("owned"))),
            "owned"
        );
        assert_eq!(Cause::from_panic_payload(Box::new(42i32)), 42i64);
        assert_eq!(Cause::from_panic_payload(Box::new(-1i64)), -1i64);

        let raised: BoxError = Box::new(Message::new("raised"));
        let cause = Cause::from_panic_payload(Box::new(raised));
        assert_eq!(
            cause.downcast_error_ref::<Message>(),
            Some(&Message::new("raised"))
        );

        let opaque = Cause::from_panic_payload(Box::new(1.5f64));
        assert_eq!(opaque.kind(), "other");
        assert_eq!(opaque.to_string(), OPAQUE_PANIC_PAYLOAD);
        assert_eq!(opaque.as_other().unwrap().downcast_cloned::<f64>(), Some(1.5));
    }

    #[test]
    fn test_wide_integers_fit_or_stay_opaque() {
        assert_eq!(Cause::from(123456isize), 123456i64);
        assert_eq!(Cause::from(123456usize), 123456i64);
        assert_eq!(Cause::from(u64::from(u32::MAX) + 1), i64::from(u32::MAX) + 1);

        let big = Cause::from(u64::MAX);
        assert_eq!(big.kind(), "other");
        assert_eq!(big.to_string(), u64::MAX.to_string());
        assert_eq!(big.as_other().unwrap().downcast_cloned::<u64>(), Some(u64::MAX));

        assert_eq!(Cause::from_panic_payload(Box::new(-7isize)), -7i64);
        let huge = Cause::from_panic_payload(Box::new(i128::MAX));
        assert_eq!(huge.to_string(), i128::MAX.to_string());
        assert!(huge.as_other().unwrap().is::<i128>());
    }

    #[test]
    fn test_unboxed_foreign_error_payload_is_opaque() {
        let cause = Cause::from_panic_payload(Box::new(io::Error::other("disk")));
        assert_eq!(cause.kind(), "other");
        assert_eq!(cause.to_string(), OPAQUE_PANIC_PAYLOAD);
        assert!(cause.as_other().unwrap().is::<io::Error>());

        let boxed: BoxError = Box::new(io::Error::other("disk"));
        let cause = Cause::from_panic_payload(Box::new(boxed));
        assert_eq!(cause.to_string(), "disk");
        assert!(cause.downcast_error_ref::<io::Error>().is_some());
    }

    #[test]
    fn test_nested_cause_is_not_flattened() {
        let inner = with_cause("inner");
        let outer = with_cause(inner);
        assert_eq!(outer.to_string(), "inner");

        let nested = outer.cause().downcast_error_ref::<CausedError>().unwrap();
        assert_eq!(nested.cause(), &"inner");
    }
}
