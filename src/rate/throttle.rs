//! Throttling: at most one call per window.
//!
//! Two separately named adapters cover the two edge policies:
//!
//! | Adapter             | Target runs                        | Gate reopens            |
//! |---------------------|------------------------------------|-------------------------|
//! | [`Throttle`]        | `delay` after the accepting call   | right after the target  |
//! | [`LeadingThrottle`] | synchronously in the accepting call| `delay` after that call |
//!
//! Calls arriving while the gate is closed are dropped, not queued.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::error::Error;
use crate::timer::Scheduler;
use crate::value::{Function, Value};

/// Whether a throttle accepts the next call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThrottleState {
    /// The next call is accepted.
    Open,
    /// Calls are dropped until the gate reopens.
    Closed,
}

struct ThrottleInner<T: ?Sized> {
    delay: Duration,
    scheduler: Rc<dyn Scheduler>,
    gate: Cell<ThrottleState>,
    target: Box<T>,
}

impl<T: ?Sized> ThrottleInner<T> {
    fn new(target: Box<T>, delay: Duration, scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            delay,
            scheduler,
            gate: Cell::new(ThrottleState::Open),
            target,
        }
    }

    fn try_close(&self) -> bool {
        if self.gate.get() == ThrottleState::Closed {
            tracing::trace!("throttled call dropped");
            return false;
        }
        self.gate.set(ThrottleState::Closed);
        true
    }
}

/// Trailing-edge throttle.
///
/// A call arriving while the gate is open closes it and schedules the
/// target to run `delay` later with that call's arguments. The gate reopens
/// only after that scheduled call has run. Calls arriving while the gate is
/// closed are dropped, so within any window of length `delay` the target
/// runs at most once.
///
/// # Examples
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use std::time::Duration;
///
/// use fnadapt::rate::Throttle;
/// use fnadapt::timer::VirtualClock;
///
/// let clock = VirtualClock::new();
/// let saves = Rc::new(Cell::new(0));
/// let counter = Rc::clone(&saves);
/// let save = Throttle::new(
///     move |()| counter.set(counter.get() + 1),
///     Duration::from_millis(100),
///     clock.clone(),
/// );
///
/// assert!(save.call(()));
/// assert!(!save.call(()));
/// clock.advance(Duration::from_millis(100));
/// assert_eq!(saves.get(), 1);
/// assert!(save.call(()));
/// ```
pub struct Throttle<A> {
    inner: Rc<ThrottleInner<dyn Fn(A)>>,
}

impl<A: 'static> Throttle<A> {
    /// Creates a trailing-edge throttle around `target`.
    pub fn new<F, S>(target: F, delay: Duration, scheduler: S) -> Self
    where
        F: Fn(A) + 'static,
        S: Scheduler + 'static,
    {
        tracing::debug!(?delay, "throttle adapter created");
        let target: Box<dyn Fn(A)> = Box::new(target);
        Self {
            inner: Rc::new(ThrottleInner::new(target, delay, Rc::new(scheduler))),
        }
    }

    /// Offers a call to the throttle.
    ///
    /// Returns `true` if the call was accepted and scheduled, `false` if it
    /// was dropped.
    pub fn call(&self, arguments: A) -> bool {
        if !self.inner.try_close() {
            return false;
        }
        let inner = Rc::clone(&self.inner);
        let timer = self.inner.scheduler.schedule(
            self.inner.delay,
            Box::new(move || {
                tracing::trace!("throttled call fired");
                (inner.target)(arguments);
                inner.gate.set(ThrottleState::Open);
            }),
        );
        tracing::trace!(%timer, "throttled call scheduled");
        true
    }
}

impl<A> Throttle<A> {
    /// Returns whether the next call would be accepted.
    pub fn state(&self) -> ThrottleState {
        self.inner.gate.get()
    }

    /// Returns the window length.
    pub fn delay(&self) -> Duration {
        self.inner.delay
    }
}

impl<A> Clone for Throttle<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A> fmt::Debug for Throttle<A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Throttle")
            .field("delay", &self.inner.delay)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Leading-edge throttle.
///
/// A call arriving while the gate is open runs the target immediately and
/// returns its result, closing the gate for `delay`. Calls arriving while
/// the gate is closed return `None` without running the target.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
///
/// use fnadapt::rate::LeadingThrottle;
/// use fnadapt::timer::VirtualClock;
///
/// let clock = VirtualClock::new();
/// let scroll = LeadingThrottle::new(|offset: u32| offset * 2, Duration::from_millis(50), clock.clone());
///
/// assert_eq!(scroll.call(10), Some(20));
/// assert_eq!(scroll.call(11), None);
/// clock.advance(Duration::from_millis(50));
/// assert_eq!(scroll.call(12), Some(24));
/// ```
pub struct LeadingThrottle<A, R> {
    inner: Rc<ThrottleInner<dyn Fn(A) -> R>>,
}

impl<A: 'static, R: 'static> LeadingThrottle<A, R> {
    /// Creates a leading-edge throttle around `target`.
    pub fn new<F, S>(target: F, delay: Duration, scheduler: S) -> Self
    where
        F: Fn(A) -> R + 'static,
        S: Scheduler + 'static,
    {
        tracing::debug!(?delay, "leading throttle adapter created");
        let target: Box<dyn Fn(A) -> R> = Box::new(target);
        Self {
            inner: Rc::new(ThrottleInner::new(target, delay, Rc::new(scheduler))),
        }
    }

    /// Offers a call to the throttle.
    ///
    /// Returns the target's result if the call was accepted, `None` if it
    /// was dropped.
    pub fn call(&self, arguments: A) -> Option<R> {
        if !self.inner.try_close() {
            return None;
        }
        let inner = Rc::clone(&self.inner);
        self.inner.scheduler.schedule(
            self.inner.delay,
            Box::new(move || {
                tracing::trace!("leading throttle reopened");
                inner.gate.set(ThrottleState::Open);
            }),
        );
        Some((self.inner.target)(arguments))
    }
}

impl<A, R> LeadingThrottle<A, R> {
    /// Returns whether the next call would be accepted.
    pub fn state(&self) -> ThrottleState {
        self.inner.gate.get()
    }

    /// Returns the window length.
    pub fn delay(&self) -> Duration {
        self.inner.delay
    }
}

impl<A, R> Clone for LeadingThrottle<A, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A, R> fmt::Debug for LeadingThrottle<A, R> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LeadingThrottle")
            .field("delay", &self.inner.delay)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Throttles a dynamic function on the trailing edge.
///
/// The returned function returns `undefined` immediately. Failures raised by
/// the target when the timer fires are reported through `tracing` at warn
/// level; the gate reopens regardless.
///
/// # Errors
///
/// Returns [`Error::Type`] if `target` is not a function.
pub fn throttle<S>(target: &Value, delay: Duration, scheduler: S) -> Result<Function, Error>
where
    S: Scheduler + 'static,
{
    let function = target.expect_function("throttle")?.clone();
    let name = function.name().to_owned();
    let length = function.length();
    let throttled = Throttle::new(
        move |(this, arguments): (Value, Vec<Value>)| {
            if let Err(error) = function.call(&this, &arguments) {
                tracing::warn!(%error, function = function.display_name(), "throttled call failed");
            }
        },
        delay,
        scheduler,
    );
    Ok(Function::method(name, length, move |this, arguments| {
        throttled.call((this.clone(), arguments.to_vec()));
        Ok(Value::Undefined)
    }))
}

/// Throttles a dynamic function on the leading edge.
///
/// An accepted call returns the target's result and propagates its
/// failure. A dropped call returns `undefined`.
///
/// # Errors
///
/// Returns [`Error::Type`] if `target` is not a function.
pub fn leading_throttle<S>(target: &Value, delay: Duration, scheduler: S) -> Result<Function, Error>
where
    S: Scheduler + 'static,
{
    let function = target.expect_function("leading_throttle")?.clone();
    let name = function.name().to_owned();
    let length = function.length();
    let throttled = LeadingThrottle::new(
        move |(this, arguments): (Value, Vec<Value>)| function.call(&this, &arguments),
        delay,
        scheduler,
    );
    Ok(Function::method(name, length, move |this, arguments| {
        throttled
            .call((this.clone(), arguments.to_vec()))
            .unwrap_or(Ok(Value::Undefined))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::VirtualClock;
    use std::cell::RefCell;

    fn recording(clock: &VirtualClock) -> (Throttle<u32>, Rc<RefCell<Vec<(u32, Duration)>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&calls);
        let now = clock.clone();
        let throttled = Throttle::new(
            move |value: u32| log.borrow_mut().push((value, now.now())),
            Duration::from_millis(100),
            clock.clone(),
        );
        (throttled, calls)
    }

    #[test]
    fn test_trailing_fires_first_accepted_arguments_after_delay() {
        let clock = VirtualClock::new();
        let (throttled, calls) = recording(&clock);

        assert!(throttled.call(1));
        assert_eq!(throttled.state(), ThrottleState::Closed);
        assert!(calls.borrow().is_empty());
        clock.advance(Duration::from_millis(50));
        assert!(!throttled.call(2));
        clock.advance(Duration::from_millis(50));

        assert_eq!(*calls.borrow(), vec![(1, Duration::from_millis(100))]);
        assert_eq!(throttled.state(), ThrottleState::Open);
    }

    #[test]
    fn test_continuous_calls_are_spaced_by_delay() {
        let clock = VirtualClock::new();
        let (throttled, calls) = recording(&clock);

        for tick in 0..100 {
            throttled.call(tick);
            clock.advance(Duration::from_millis(10));
        }

        let calls = calls.borrow();
        assert!(calls.len() <= 10);
        assert!(!calls.is_empty());
        for pair in calls.windows(2) {
            assert!(pair[1].1 - pair[0].1 >= Duration::from_millis(100));
        }
    }

    #[test]
    fn test_target_reentry_is_dropped_until_it_returns() {
        let clock = VirtualClock::new();
        let slot: Rc<RefCell<Option<Throttle<()>>>> = Rc::new(RefCell::new(None));
        let accepted = Rc::new(RefCell::new(Vec::new()));
        let throttled = {
            let slot = Rc::clone(&slot);
            let accepted = Rc::clone(&accepted);
            Throttle::new(
                move |()| {
                    let inner = slot.borrow().clone();
                    if let Some(inner) = inner {
                        accepted.borrow_mut().push(inner.call(()));
                    }
                },
                Duration::from_millis(10),
                clock.clone(),
            )
        };
        *slot.borrow_mut() = Some(throttled.clone());
        throttled.call(());
        clock.advance(Duration::from_millis(10));
        assert_eq!(*accepted.borrow(), vec![false]);
        slot.borrow_mut().take();
    }

    #[test]
    fn test_leading_runs_immediately_and_reopens_after_delay() {
        let clock = VirtualClock::new();
        let throttled = LeadingThrottle::new(|value: i32| value + 1, Duration::from_millis(100), clock.clone());

        assert_eq!(throttled.call(1), Some(2));
        assert_eq!(throttled.state(), ThrottleState::Closed);
        clock.advance(Duration::from_millis(99));
        assert_eq!(throttled.call(2), None);
        clock.advance(Duration::from_millis(1));
        assert_eq!(throttled.state(), ThrottleState::Open);
        assert_eq!(throttled.call(3), Some(4));
    }

    #[test]
    fn test_dynamic_throttle_returns_undefined_and_fires_later() {
        let clock = VirtualClock::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let target = Function::native("record", 1, move |_, arguments| {
            log.borrow_mut().push(arguments[0].clone());
            Ok(Value::from("ignored"))
        });
        let throttled = throttle(&Value::from(target), Duration::from_millis(20), clock.clone()).unwrap();

        assert_eq!(throttled.invoke(&[Value::from("a")]).unwrap(), Value::Undefined);
        throttled.invoke(&[Value::from("b")]).unwrap();
        clock.advance(Duration::from_millis(20));
        throttled.invoke(&[Value::from("c")]).unwrap();
        clock.advance(Duration::from_millis(20));

        assert_eq!(*seen.borrow(), vec![Value::from("a"), Value::from("c")]);
    }

    #[test]
    fn test_dynamic_throttle_reopens_after_failure() {
        let clock = VirtualClock::new();
        let failing = Function::native("failing", 0, |_, _| Err(Error::thrown("nope")));
        let throttled = throttle(&Value::from(failing), Duration::from_millis(5), clock.clone()).unwrap();
        throttled.invoke(&[]).unwrap();
        clock.advance(Duration::from_millis(5));
        throttled.invoke(&[]).unwrap();
        assert_eq!(clock.pending(), 1);
    }

    #[test]
    fn test_dynamic_leading_throttle_propagates_result_and_error() {
        let clock = VirtualClock::new();
        let checked = Function::native("checked", 1, |_, arguments| {
            if arguments[0].to_number() < 0.0 {
                Err(Error::thrown("negative"))
            } else {
                Ok(arguments[0].clone())
            }
        });
        let throttled =
            leading_throttle(&Value::from(checked), Duration::from_millis(10), clock.clone()).unwrap();

        assert_eq!(throttled.invoke(&[Value::from(4)]).unwrap(), Value::from(4));
        assert_eq!(throttled.invoke(&[Value::from(5)]).unwrap(), Value::Undefined);
        clock.advance(Duration::from_millis(10));
        assert_eq!(
            throttled.invoke(&[Value::from(-1)]).unwrap_err(),
            Error::thrown("negative")
        );
    }

    #[test]
    fn test_dynamic_throttles_reject_non_callable() {
        assert_eq!(
            throttle(&Value::from(1), Duration::ZERO, VirtualClock::new()).unwrap_err(),
            Error::type_error("throttle target must be callable, found number")
        );
        assert_eq!(
            leading_throttle(&Value::from(1), Duration::ZERO, VirtualClock::new()).unwrap_err(),
            Error::type_error("leading_throttle target must be callable, found number")
        );
    }
}
