//! Binding a policy to a function.
//!
//! Two forms are offered:
//! - [`Retryable`], a value that owns a policy and a function and can be called repeatedly.
//!   [`retry`] builds one with the default policy; [`RetryPolicy::wrap`] with an explicit one.
//! - [`retrying!`](crate::retrying), which declares an ordinary `fn` whose body is retried.
//!   The function keeps its name, visibility and attributes.
//!
//! ```rust
//! use persevere::{retry, RetryPolicy, Stop, InstantSleeper};
//!
//! fn parse_port(raw: &str) -> Result<u16, std::num::ParseIntError> {
//!     raw.trim().parse()
//! }
//!
//! let policy = RetryPolicy::<u16, std::num::ParseIntError>::builder()
//!     .stop(Stop::after_attempt(2))
//!     .with_sleeper(InstantSleeper)
//!     .build()
//!     .unwrap();
//! let parse = policy.wrap(parse_port);
//! assert_eq!(parse.call(" 8080 ").unwrap(), 8080);
//! assert!(parse.name().ends_with("parse_port"));
//!
//! // defaults: retry every error forever, no wait
//! let always_ok = retry(|raw: &str| raw.parse::<u8>());
//! assert_eq!(always_ok.call("7").unwrap(), 7);
//! ```

use crate::error::ResilienceError;
use crate::retry::RetryPolicy;
use std::borrow::Cow;
use std::fmt;

/// A function bound to the policy that retries it.
///
/// Only the name of the wrapped function is kept, and for closures it is a `{{closure}}` path.
/// Use [`Retryable::named`] to set a readable name, or [`retrying!`](crate::retrying) to declare
/// a function that keeps its own name and doc comments.
pub struct Retryable<F, T, E> {
    policy: RetryPolicy<T, E>,
    f: F,
    name: Cow<'static, str>,
}

impl<F, T, E> Retryable<F, T, E> {
    /// Bind `f` to `policy`. The name defaults to the type name of `f`, which for a `fn` item
    /// is its path.
    pub fn new(policy: RetryPolicy<T, E>, f: F) -> Self {
        Self { policy, f, name: Cow::Borrowed(std::any::type_name::<F>()) }
    }

    /// Override the reported name.
    pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Name of the wrapped function.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The policy applied on every call.
    pub fn policy(&self) -> &RetryPolicy<T, E> {
        &self.policy
    }

    /// Borrow the wrapped function.
    pub fn inner(&self) -> &F {
        &self.f
    }

    /// Unwrap the function, dropping the policy.
    pub fn into_inner(self) -> F {
        self.f
    }

    /// Call the function with `args`, retrying per the policy. `args` is passed unchanged to
    /// every attempt.
    pub fn call<A>(&self, args: &A) -> Result<T, ResilienceError<T, E>>
    where
        A: ?Sized,
        F: Fn(&A) -> Result<T, E>,
    {
        self.policy.call(&self.f, args)
    }

    /// Call a function that takes no arguments.
    pub fn run(&self) -> Result<T, ResilienceError<T, E>>
    where
        F: Fn() -> Result<T, E>,
    {
        self.policy.execute(&self.f)
    }
}

impl<F: Clone, T, E> Clone for Retryable<F, T, E> {
    fn clone(&self) -> Self {
        Self { policy: self.policy.clone(), f: self.f.clone(), name: self.name.clone() }
    }
}

impl<F, T, E> fmt::Debug for Retryable<F, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retryable").field("name", &self.name).field("policy", &self.policy).finish()
    }
}

impl<T, E> RetryPolicy<T, E> {
    /// Bind `f` to this policy.
    pub fn wrap<F>(self, f: F) -> Retryable<F, T, E> {
        Retryable::new(self, f)
    }
}

/// Bind `f` to the default policy: retry every error without bound, never wait.
pub fn retry<F, T, E>(f: F) -> Retryable<F, T, E> {
    Retryable::new(RetryPolicy::default(), f)
}

/// Declare a function whose body is retried.
///
/// Without configuration the default policy applies. An optional `#[retry(key = value, ..)]`
/// attribute, written first, calls the builder method `key` with `value`. The policy is built
/// on every call; a configuration error comes back as `ResilienceError::InvalidConfig`.
///
/// The return type must be spelled `Result<T, E>`; the generated function returns
/// `Result<T, ResilienceError<T, E>>`. Arguments are borrowed by each attempt, so the body
/// must not move out of them.
///
/// ```rust
/// use persevere::{retrying, InstantSleeper, ResilienceError, Stop};
/// use std::cell::Cell;
///
/// retrying! {
///     #[retry(stop = Stop::after_attempt(3), with_sleeper = InstantSleeper)]
///     /// Counts down and fails until it reaches zero.
///     fn countdown(left: &Cell<u32>) -> Result<&'static str, String> {
///         if left.get() == 0 {
///             return Ok("liftoff");
///         }
///         left.set(left.get() - 1);
///         Err(format!("{} to go", left.get()))
///     }
/// }
///
/// assert_eq!(countdown(&Cell::new(2)), Ok("liftoff"));
/// assert_eq!(countdown(&Cell::new(5)), Err(ResilienceError::Inner("2 to go".to_string())));
/// ```
#[macro_export]
macro_rules! retrying {
    (
        #[retry($($key:ident = $value:expr),* $(,)?)]
        $(#[$attr:meta])*
        $vis:vis fn $name:ident($($arg:ident : $ty:ty),* $(,)?) -> Result<$ok:ty, $err:ty>
        $body:block
    ) => {
        $(#[$attr])*
        $vis fn $name($($arg: $ty),*)
            -> ::std::result::Result<$ok, $crate::ResilienceError<$ok, $err>>
        {
            let policy = $crate::RetryPolicy::<$ok, $err>::builder()
                $(.$key($value))*
                .build()?;
            policy.execute(|| -> ::std::result::Result<$ok, $err> { $body })
        }
    };
    (
        $(#[$attr:meta])*
        $vis:vis fn $name:ident($($arg:ident : $ty:ty),* $(,)?) -> Result<$ok:ty, $err:ty>
        $body:block
    ) => {
        $crate::retrying! {
            #[retry()]
            $(#[$attr])*
            $vis fn $name($($arg: $ty),*) -> Result<$ok, $err> $body
        }
    };
}
