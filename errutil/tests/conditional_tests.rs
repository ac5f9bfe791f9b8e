//! Conditional panic tests: `when(false)` is inert, `when(true)` unwinds
//! with the bound error, and recovery rewraps any panic payload.

use errutil::{BoxError, Cause, CausedError, Message, catch, panic, panicf, recover, with_cause};
use std::panic::{AssertUnwindSafe, catch_unwind, panic_any};

/// Recover whatever `payload` panics with and rewrap it as a cause.
fn panic_to_error<T: Send + 'static>(payload: T) -> CausedError {
    match catch_unwind(AssertUnwindSafe(move || -> () { panic_any(payload) })) {
        Ok(()) => unreachable!("panic_any returned"),
        Err(raised) => recover(raised),
    }
}

/// Test: a false condition never raises.
#[test]
fn when_false_is_noop() {
    panic(Message::new("test error")).when(false);
    panicf!("reason: {}", "never").when(false);
}

/// Test: a true condition raises exactly the bound error.
#[test]
fn when_true_raises_bound_error() {
    let raised = catch_unwind(|| panic(Message::new("reason: panic")).when(true))
        .expect_err("must unwind");

    let err = raised.downcast::<BoxError>().expect("payload is the bound error");
    assert_eq!(
        err.downcast_ref::<Message>(),
        Some(&Message::new("reason: panic"))
    );
}

/// Test: `panicf!` raises an error carrying the formatted message.
#[test]
fn panicf_raises_formatted_message() {
    let err = catch(|| panicf!("reason: {}", "panicf").when(true)).expect_err("must unwind");
    assert_eq!(err.to_string(), "reason: panicf");
    assert_eq!(
        err.cause().downcast_error_ref::<Message>(),
        Some(&Message::new("reason: panicf"))
    );
}

/// Test: a recovered string panic is extractable as the same string.
#[test]
fn panic_is_string() {
    let err = panic_to_error("this is a string");
    assert_eq!(err.cause(), &"this is a string");
}

/// Test: a recovered error panic is extractable as the same error.
#[test]
fn panic_is_error() {
    let raised: BoxError = Box::new(Message::new("this is an error"));
    let err = panic_to_error(raised);
    assert_eq!(err.to_string(), "this is an error");
    assert_eq!(
        err.cause().downcast_error_ref::<Message>(),
        Some(&Message::new("this is an error"))
    );
}

/// Test: a recovered integer panic is extractable as the same integer.
#[test]
fn panic_is_int() {
    let err = panic_to_error(123456);
    assert_eq!(err.cause().as_int(), Some(123456));
}

/// Test: recovered `isize` and `usize` panics are extractable as integers.
#[test]
fn panic_is_isize_and_usize() {
    let err = panic_to_error(123456isize);
    assert_eq!(err.cause().kind(), "int");
    assert_eq!(err.cause().as_int(), Some(123456));
    assert_eq!(err.to_string(), "123456");

    let err = panic_to_error(123456usize);
    assert_eq!(err.cause().as_int(), Some(123456));

    let err = panic_to_error(u64::MAX);
    assert_eq!(err.to_string(), u64::MAX.to_string());
    assert_eq!(
        err.cause().as_other().and_then(|o| o.downcast_cloned::<u64>()),
        Some(u64::MAX)
    );
}

/// Test: a recovered cause can be attached again without losing its kind.
#[test]
fn recovered_cause_rewraps() {
    let err = panic_to_error(with_cause(7).into_cause());
    assert_eq!(err.cause().as_int(), Some(7));

    let rewrapped = with_cause(err);
    let inner = rewrapped
        .cause()
        .downcast_error_ref::<CausedError>()
        .expect("nested caused error");
    assert_eq!(inner.cause().as_int(), Some(7));
}

/// Test: an unrecognised payload type survives as an opaque cause.
#[test]
fn panic_is_other() {
    let err = panic_to_error(vec![1u8, 2, 3]);
    let other = err.cause().as_other().expect("opaque payload");
    assert_eq!(other.downcast_cloned::<Vec<u8>>(), Some(vec![1, 2, 3]));
    assert!(matches!(err.cause(), Cause::Other(_)));
}

/// Test: a panic in another thread is not seen by `catch` on this one.
#[test]
fn panic_stays_on_its_thread() {
    let outcome = catch(|| {
        let handle = std::thread::spawn(|| panicf!("worker failed").when(true));
        handle.join().map_err(recover)
    });

    let joined = outcome.expect("this thread did not unwind");
    let err = joined.expect_err("worker thread unwound");
    assert_eq!(err.to_string(), "worker failed");
}
