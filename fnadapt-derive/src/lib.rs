//! Procedural macros for fnadapt.
//!
//! # Available Function-like Macros
//!
//! - [`native!`]: Builds a `fnadapt::value::Function` from a closure and
//!   infers its declared arity from the closure's parameter list
//!
//! # Example
//!
//! ```rust,ignore
//! use fnadapt::native;
//! use fnadapt::value::Value;
//!
//! let add = native!("add", |_this, a, b| Ok(Value::from(a.to_number() + b.to_number())));
//! assert_eq!(add.length(), 2);
//! assert_eq!(add.invoke(&[Value::from(1), Value::from(2)]).unwrap(), Value::from(3));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod native;

use proc_macro::TokenStream;

/// Builds a constructible `Function` whose `length` is derived from the
/// closure.
///
/// The first closure parameter binds the receiver (`&Value`). Every further
/// parameter binds one positional argument by value; missing arguments are
/// `Value::Undefined`. The declared arity is the number of those further
/// parameters. The closure body must evaluate to
/// `Result<Value, fnadapt::Error>`, so `?` works inside it.
///
/// # Forms
///
/// - `native!(|this, a, b| body)`: anonymous function
/// - `native!("name", |this, a, b| body)`: named function
///
/// # Generated Code
///
/// For `native!("add", |this, a, b| body)`, generates:
///
/// ```rust,ignore
/// ::fnadapt::value::Function::native("add", 2usize, move |__fnadapt_this, __fnadapt_arguments| {
///     let this = __fnadapt_this;
///     let a = __fnadapt_arguments.get(0usize).cloned().unwrap_or_default();
///     let b = __fnadapt_arguments.get(1usize).cloned().unwrap_or_default();
///     body
/// })
/// ```
///
/// # Example
///
/// ```rust,ignore
/// use fnadapt::native;
/// use fnadapt::value::Value;
///
/// let greet = native!("greet", |this, name| {
///     Ok(Value::from(format!("{}: hello {name}", this)))
/// });
/// assert_eq!(greet.name(), "greet");
/// assert_eq!(greet.length(), 1);
/// ```
///
/// # Errors
///
/// Compilation fails when the closure declares no receiver parameter, when
/// it is `async`, or when the name is not a string literal.
#[proc_macro]
pub fn native(input: TokenStream) -> TokenStream {
    native::native_impl(input.into()).into()
}
