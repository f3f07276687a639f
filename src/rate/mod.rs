//! Rate adapters: debounce and throttle.
//!
//! Each adapter comes in two layers:
//!
//! - a typed core ([`Debounce`], [`Throttle`], [`LeadingThrottle`]) generic
//!   over the argument type, usable with any Rust closure
//! - a dynamic wrapper ([`debounce`], [`throttle`], [`leading_throttle`])
//!   that adapts a [`Function`](crate::value::Function) and preserves the
//!   caller's receiver
//!
//! Time comes from a [`Scheduler`](crate::timer::Scheduler). Tests use
//! [`VirtualClock`](crate::timer::VirtualClock); applications running on
//! tokio use [`TokioScheduler`](crate::timer::TokioScheduler).
//!
//! # Examples
//!
//! ```rust
//! use std::time::Duration;
//!
//! use fnadapt::rate::throttle;
//! use fnadapt::timer::VirtualClock;
//! use fnadapt::value::{Function, Value};
//!
//! let clock = VirtualClock::new();
//! let save = Function::native("save", 0, |_, _| Ok(Value::Undefined));
//! let throttled = throttle(&Value::from(save), Duration::from_millis(100), clock.clone()).unwrap();
//!
//! throttled.invoke(&[]).unwrap();
//! throttled.invoke(&[]).unwrap();
//! assert_eq!(clock.run_until_idle(), 1);
//! ```

mod config;
mod debounce;
mod throttle;

pub use config::{Edge, RateLimit};
pub use debounce::{Debounce, DebounceState, debounce};
pub use throttle::{LeadingThrottle, Throttle, ThrottleState, leading_throttle, throttle};
