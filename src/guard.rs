//! One-shot invocation guards.
//!
//! [`Once`] forwards the first call it receives and turns every later call
//! into a no-op. The latch is irreversible: nothing resets it.
//!
//! # Examples
//!
//! ```rust
//! use fnadapt::guard::Once;
//!
//! let init = Once::new(|name: &str| format!("Hello, {name}!"));
//!
//! assert_eq!(init.call("world"), Some("Hello, world!".to_string()));
//! assert_eq!(init.call("again"), None);
//! assert!(init.is_spent());
//! ```

use std::cell::RefCell;
use std::fmt;

use crate::error::Error;
use crate::value::{Function, Value};

/// A latch that forwards only its first invocation.
///
/// The wrapped function is taken out of the guard before it runs, so a call
/// made from inside the target itself is already a no-op.
///
/// # Type Parameters
///
/// * `F` - The wrapped function. Only [`FnOnce`] is required since it runs
///   at most once.
pub struct Once<F> {
    function: RefCell<Option<F>>,
}

impl<F> Once<F> {
    /// Wraps `function` in a fresh, untripped guard.
    pub const fn new(function: F) -> Self {
        Self {
            function: RefCell::new(Some(function)),
        }
    }

    /// Forwards `arguments` to the wrapped function on the first call and
    /// returns its result. Every later call returns `None`.
    pub fn call<A, R>(&self, arguments: A) -> Option<R>
    where
        F: FnOnce(A) -> R,
    {
        let function = self.function.borrow_mut().take();
        match function {
            Some(function) => {
                tracing::debug!("once guard tripped");
                Some(function(arguments))
            }
            None => {
                tracing::trace!("once guard already tripped, call ignored");
                None
            }
        }
    }

    /// Returns `true` once the first call has been made.
    pub fn is_spent(&self) -> bool {
        self.function.borrow().is_none()
    }
}

impl<F> fmt::Debug for Once<F> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Once")
            .field("spent", &self.is_spent())
            .finish()
    }
}

/// Wraps a dynamic function so that only its first call reaches it.
///
/// The first call forwards the caller's receiver and arguments and returns
/// the target's result. Every later call returns `undefined` without
/// touching the target.
///
/// # Errors
///
/// Returns [`Error::Type`] if `target` is not a function.
///
/// # Examples
///
/// ```rust
/// use fnadapt::guard::once;
/// use fnadapt::value::{Function, Value};
///
/// let greet = Function::native("greet", 1, |_, arguments| {
///     Ok(Value::from(format!("hi {}", arguments[0])))
/// });
/// let greet_once = once(&Value::from(greet)).unwrap();
///
/// assert_eq!(greet_once.invoke(&[Value::from("a")]).unwrap(), Value::from("hi a"));
/// assert_eq!(greet_once.invoke(&[Value::from("b")]).unwrap(), Value::Undefined);
/// ```
pub fn once(target: &Value) -> Result<Function, Error> {
    let function = target.expect_function("once")?.clone();
    let name = function.name().to_owned();
    let length = function.length();
    let guard = Once::new(move |(this, arguments): (Value, Vec<Value>)| {
        function.call(&this, &arguments)
    });
    Ok(Function::method(name, length, move |this, arguments| {
        guard
            .call((this.clone(), arguments.to_vec()))
            .unwrap_or(Ok(Value::Undefined))
    }))
}
