//! Closure combinators: error adapters, arity adapters and common
//! predicates.

use crate::utils::error::{KclError, Result};
use std::fmt::Display;

/// Turns a fallible function into an infallible one that panics with the
/// error message. Use it where a caller cannot propagate errors.
pub fn protect<T, R, E, F>(f: F) -> impl Fn(T) -> R
where
    F: Fn(T) -> std::result::Result<R, E>,
    E: Display,
{
    move |value| match f(value) {
        Ok(result) => result,
        Err(e) => panic!("{}", e),
    }
}

pub fn protect_consumer<T, E, F>(f: F) -> impl Fn(T)
where
    F: Fn(T) -> std::result::Result<(), E>,
    E: Display,
{
    move |value| {
        if let Err(e) = f(value) {
            panic!("{}", e);
        }
    }
}

pub fn protect_supplier<R, E, F>(f: F) -> impl Fn() -> R
where
    F: Fn() -> std::result::Result<R, E>,
    E: Display,
{
    move || match f() {
        Ok(result) => result,
        Err(e) => panic!("{}", e),
    }
}

pub fn protect_predicate<T, E, F>(f: F) -> impl Fn(T) -> bool
where
    F: Fn(T) -> std::result::Result<bool, E>,
    E: Display,
{
    protect(f)
}

/// Maps any error of `f` into a [`KclError::WrappedError`].
pub fn wrap<T, R, E, F>(f: F) -> impl Fn(T) -> Result<R>
where
    F: Fn(T) -> std::result::Result<R, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    move |value| f(value).map_err(|e| KclError::wrap(e, "function failed"))
}

/// The second argument is ignored.
pub fn function_to_bi_function<A, B, R, F>(f: F) -> impl Fn(A, B) -> R
where
    F: Fn(A) -> R,
{
    move |a, _| f(a)
}

pub fn function_to_tri_function<A, B, C, R, F>(f: F) -> impl Fn(A, B, C) -> R
where
    F: Fn(A) -> R,
{
    move |a, _, _| f(a)
}

pub fn bi_function_to_tri_function<A, B, C, R, F>(f: F) -> impl Fn(A, B, C) -> R
where
    F: Fn(A, B) -> R,
{
    move |a, b, _| f(a, b)
}

/// Fixes the second argument.
pub fn bi_function_to_function<A, B, R, F>(f: F, second: B) -> impl Fn(A) -> R
where
    F: Fn(A, B) -> R,
    B: Clone,
{
    move |a| f(a, second.clone())
}

pub fn consumer_to_bi_consumer<A, B, F>(f: F) -> impl Fn(A, B)
where
    F: Fn(A),
{
    move |a, _| f(a)
}

pub fn consumer_to_tri_consumer<A, B, C, F>(f: F) -> impl Fn(A, B, C)
where
    F: Fn(A),
{
    move |a, _, _| f(a)
}

/// Calls the consumer and hands its argument back.
pub fn consumer_to_function<A, F>(f: F) -> impl Fn(A) -> A
where
    F: Fn(&A),
{
    move |a| {
        f(&a);
        a
    }
}

/// `None` passes through without calling `f`.
pub fn null_safe<T, R, F>(f: F) -> impl Fn(Option<T>) -> Option<R>
where
    F: Fn(T) -> R,
{
    move |value| value.map(&f)
}

pub fn not<T: ?Sized, P>(predicate: P) -> impl Fn(&T) -> bool
where
    P: Fn(&T) -> bool,
{
    move |value| !predicate(value)
}

pub fn and<T: ?Sized, P, Q>(first: P, second: Q) -> impl Fn(&T) -> bool
where
    P: Fn(&T) -> bool,
    Q: Fn(&T) -> bool,
{
    move |value| first(value) && second(value)
}

pub fn or<T: ?Sized, P, Q>(first: P, second: Q) -> impl Fn(&T) -> bool
where
    P: Fn(&T) -> bool,
    Q: Fn(&T) -> bool,
{
    move |value| first(value) || second(value)
}

pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

pub fn is_not_blank(text: &str) -> bool {
    !is_blank(text)
}

pub fn is_some<T>(value: &Option<T>) -> bool {
    value.is_some()
}

pub fn accept_all<T: ?Sized>(_: &T) -> bool {
    true
}

pub fn accept_none<T: ?Sized>(_: &T) -> bool {
    false
}
