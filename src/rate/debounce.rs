//! Trailing-edge debouncing.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::error::Error;
use crate::timer::{Scheduler, TimerId};
use crate::value::{Function, Value};

/// Whether a debounced call is waiting to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebounceState {
    /// Nothing is scheduled.
    Idle,
    /// A call is scheduled and will fire unless superseded.
    Pending,
}

struct DebounceInner<A> {
    target: Box<dyn Fn(A)>,
    delay: Duration,
    scheduler: Rc<dyn Scheduler>,
    pending: Cell<Option<TimerId>>,
}

/// Delays calls until they stop arriving for `delay`.
///
/// Every call cancels the previously scheduled one and schedules itself
/// `delay` later, so a burst of calls spaced less than `delay` apart
/// produces exactly one call of the target, with the arguments of the last
/// call in the burst, `delay` after that last call.
///
/// A scheduled call keeps the adapter alive until it fires, even if every
/// handle to the `Debounce` has been dropped.
///
/// # Examples
///
/// ```rust
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use std::time::Duration;
///
/// use fnadapt::rate::Debounce;
/// use fnadapt::timer::VirtualClock;
///
/// let clock = VirtualClock::new();
/// let searches = Rc::new(RefCell::new(Vec::new()));
/// let log = Rc::clone(&searches);
/// let search = Debounce::new(
///     move |query: &'static str| log.borrow_mut().push(query),
///     Duration::from_millis(300),
///     clock.clone(),
/// );
///
/// search.call("r");
/// search.call("ru");
/// search.call("rust");
/// clock.advance(Duration::from_millis(300));
///
/// assert_eq!(*searches.borrow(), vec!["rust"]);
/// ```
pub struct Debounce<A> {
    inner: Rc<DebounceInner<A>>,
}

impl<A: 'static> Debounce<A> {
    /// Creates a debounced adapter around `target`.
    pub fn new<F, S>(target: F, delay: Duration, scheduler: S) -> Self
    where
        F: Fn(A) + 'static,
        S: Scheduler + 'static,
    {
        tracing::debug!(?delay, "debounce adapter created");
        Self {
            inner: Rc::new(DebounceInner {
                target: Box::new(target),
                delay,
                scheduler: Rc::new(scheduler),
                pending: Cell::new(None),
            }),
        }
    }

    /// Schedules a call with `arguments`, superseding any pending one.
    pub fn call(&self, arguments: A) {
        if let Some(previous) = self.inner.pending.take()
            && self.inner.scheduler.cancel(previous)
        {
            tracing::trace!(timer = %previous, "debounced call superseded");
        }
        let inner = Rc::clone(&self.inner);
        let timer = self.inner.scheduler.schedule(
            self.inner.delay,
            Box::new(move || {
                inner.pending.set(None);
                tracing::trace!("debounced call fired");
                (inner.target)(arguments);
            }),
        );
        self.inner.pending.set(Some(timer));
    }
}

impl<A> Debounce<A> {
    /// Returns whether a call is waiting to fire.
    pub fn state(&self) -> DebounceState {
        if self.inner.pending.get().is_some() {
            DebounceState::Pending
        } else {
            DebounceState::Idle
        }
    }

    /// Returns the quiet period this adapter waits for.
    pub fn delay(&self) -> Duration {
        self.inner.delay
    }
}

impl<A> Clone for Debounce<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A> fmt::Debug for Debounce<A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Debounce")
            .field("delay", &self.inner.delay)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Debounces a dynamic function.
///
/// The returned function remembers the receiver and arguments of its
/// latest call and returns `undefined` immediately. Failures raised by the
/// target when the timer fires have no caller left to receive them and are
/// reported through `tracing` at warn level.
///
/// # Errors
///
/// Returns [`Error::Type`] if `target` is not a function.
pub fn debounce<S>(target: &Value, delay: Duration, scheduler: S) -> Result<Function, Error>
where
    S: Scheduler + 'static,
{
    let function = target.expect_function("debounce")?.clone();
    let name = function.name().to_owned();
    let length = function.length();
    let debounced = Debounce::new(
        move |(this, arguments): (Value, Vec<Value>)| {
            if let Err(error) = function.call(&this, &arguments) {
                tracing::warn!(%error, function = function.display_name(), "debounced call failed");
            }
        },
        delay,
        scheduler,
    );
    Ok(Function::method(name, length, move |this, arguments| {
        debounced.call((this.clone(), arguments.to_vec()));
        Ok(Value::Undefined)
    }))
}
