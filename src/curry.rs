//! Argument currying over dynamic functions.
//!
//! A curried function collects arguments across calls until at least
//! `arity` of them are present, then invokes the target with everything it
//! collected. Extra arguments beyond the arity are forwarded as well.
//!
//! ```text
//! curry(f)(a)(b)(c) = curry(f)(a, b)(c) = curry(f)(a, b, c) = f(a, b, c)
//! ```
//!
//! # Design Decisions
//!
//! Every partial step owns its own copy of the accumulated arguments behind
//! an `Rc<[Value]>`. Calling the same partial step twice therefore produces
//! two independent chains that never observe each other.
//!
//! The receiver is not fixed at creation: the final call in a chain decides
//! which `this` the target observes.
//!
//! # Examples
//!
//! ```rust
//! use fnadapt::curry::curry;
//! use fnadapt::value::{Function, Value};
//!
//! let add = Function::native("add", 3, |_, arguments| {
//!     Ok(Value::from(arguments.iter().map(Value::to_number).sum::<f64>()))
//! });
//!
//! let curried = curry(&Value::from(add)).unwrap();
//! let add_one = curried.invoke(&[Value::from(1)]).unwrap();
//!
//! let six = add_one
//!     .invoke(&[Value::from(2)])
//!     .and_then(|step| step.invoke(&[Value::from(3)]))
//!     .unwrap();
//! assert_eq!(six, Value::from(6));
//!
//! let eleven = add_one.invoke(&[Value::from(5), Value::from(5)]).unwrap();
//! assert_eq!(eleven, Value::from(11));
//! ```

use std::rc::Rc;

use crate::error::Error;
use crate::value::{Function, Value};

/// Curries `target` using its declared `length` as arity.
///
/// # Errors
///
/// Returns [`Error::Type`] if `target` is not a function.
pub fn curry(target: &Value) -> Result<Function, Error> {
    let function = target.expect_function("curry")?;
    Ok(curried(function.clone(), function.length(), Rc::from(Vec::new())))
}

/// Curries `target` with an explicitly supplied arity.
///
/// Useful for variadic targets whose declared `length` is zero.
///
/// # Errors
///
/// Returns [`Error::Type`] if `target` is not a function.
pub fn curry_with_arity(target: &Value, arity: usize) -> Result<Function, Error> {
    let function = target.expect_function("curry")?;
    Ok(curried(function.clone(), arity, Rc::from(Vec::new())))
}

/// Curries `target` with `initial` already accumulated.
///
/// The returned function is still a function even when `initial` alone
/// satisfies the arity; the target runs on the next call.
///
/// # Errors
///
/// Returns [`Error::Type`] if `target` is not a function.
pub fn curry_with(target: &Value, initial: Vec<Value>) -> Result<Function, Error> {
    let function = target.expect_function("curry")?;
    Ok(curried(function.clone(), function.length(), Rc::from(initial)))
}

fn curried(target: Function, arity: usize, accumulated: Rc<[Value]>) -> Function {
    let name = format!("curried {}", target.name());
    let length = arity.saturating_sub(accumulated.len());
    tracing::trace!(
        target_name = target.display_name(),
        arity,
        accumulated = accumulated.len(),
        "curry step created"
    );
    Function::method(name, length, move |this, arguments| {
        let mut all = Vec::with_capacity(accumulated.len() + arguments.len());
        all.extend_from_slice(&accumulated);
        all.extend_from_slice(arguments);
        if all.len() >= arity {
            target.call(this, &all)
        } else {
            Ok(Value::Function(curried(target.clone(), arity, Rc::from(all))))
        }
    })
}
