//! # fnadapt
//!
//! Function adapters for Rust: context binding, currying, debouncing,
//! throttling and one-shot guards.
//!
//! ## Overview
//!
//! The adapters wrap a callable and return a new callable that changes how,
//! when or how often the original runs:
//!
//! - **Context binding**: [`bind`](bind::bind) fixes a receiver and leading
//!   arguments, and still works when the result is used as a constructor
//! - **Currying**: [`curry`](curry::curry) collects arguments across calls
//!   until the declared arity is reached
//! - **Rate limiting**: [`debounce`](rate::debounce) and
//!   [`throttle`](rate::throttle) defer or drop calls using a
//!   [`Scheduler`](timer::Scheduler)
//! - **Invocation guard**: [`once`](guard::once) forwards only the first call
//!
//! Adapters operate on a small dynamic [`value`] model: functions that take a
//! receiver and an argument list, carry a name, a declared arity and an
//! optional prototype. The rate and guard adapters additionally have typed
//! cores ([`rate::Debounce`], [`rate::Throttle`], [`guard::Once`]) usable with
//! plain Rust closures.
//!
//! ## Feature Flags
//!
//! - `derive`: the [`native!`] macro, which infers a function's arity from its
//!   closure parameters
//! - `async`: [`timer::TokioScheduler`], timers on the tokio runtime
//! - `serde`: `Serialize`/`Deserialize` for [`rate::RateLimit`]
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use fnadapt::prelude::*;
//!
//! let add = Function::native("add", 3, |_, arguments| {
//!     Ok(Value::from(arguments.iter().map(Value::to_number).sum::<f64>()))
//! });
//! let curried = curry(&Value::from(add)).unwrap();
//! let add_one = curried.invoke(&[Value::from(1)]).unwrap();
//! let add_three = add_one.call(&Value::Undefined, &[Value::from(2)]).unwrap();
//! assert_eq!(
//!     add_three.as_function().unwrap().invoke(&[Value::from(3)]).unwrap(),
//!     Value::from(6)
//! );
//!
//! let clock = VirtualClock::new();
//! let save = Function::native("save", 0, |_, _| Ok(Value::Undefined));
//! let save_later = debounce(&Value::from(save), Duration::from_millis(300), clock.clone()).unwrap();
//! save_later.invoke(&[]).unwrap();
//! assert_eq!(clock.run_until_idle(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports the adapters, the value model and the schedulers.
///
/// # Usage
///
/// ```rust
/// use fnadapt::prelude::*;
/// ```
pub mod prelude {
    pub use crate::bind::{BindCache, bind};
    pub use crate::curry::{curry, curry_with, curry_with_arity};
    pub use crate::error::{Error, ErrorKind};
    pub use crate::guard::{Once, once};
    pub use crate::rate::*;
    pub use crate::timer::{Scheduler, TimerId, VirtualClock};
    pub use crate::value::{Function, Object, Value};

    #[cfg(feature = "async")]
    pub use crate::timer::TokioScheduler;

    #[cfg(feature = "derive")]
    pub use fnadapt_derive::native;
}

pub mod bind;
pub mod curry;
pub mod error;
pub mod guard;
pub mod rate;
pub mod timer;
pub mod value;

pub use error::{Error, ErrorKind};

#[cfg(feature = "derive")]
pub use fnadapt_derive::native;
