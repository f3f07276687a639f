//! Deferred execution.
//!
//! The rate adapters never sleep themselves. They hand a task and a delay to
//! a [`Scheduler`] and keep the returned [`TimerId`] so they can cancel the
//! task later. Two schedulers are provided:
//!
//! - [`VirtualClock`]: a manually advanced clock with exact, deterministic
//!   firing order
//! - [`TokioScheduler`]: real timers on a tokio `LocalSet` (feature `async`)
//!
//! # Examples
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use std::time::Duration;
//!
//! use fnadapt::timer::{Scheduler, VirtualClock};
//!
//! let clock = VirtualClock::new();
//! let fired = Rc::new(Cell::new(false));
//! let flag = Rc::clone(&fired);
//!
//! clock.schedule(Duration::from_millis(100), Box::new(move || flag.set(true)));
//!
//! clock.advance(Duration::from_millis(99));
//! assert!(!fired.get());
//! clock.advance(Duration::from_millis(1));
//! assert!(fired.get());
//! ```

mod virtual_clock;

#[cfg(feature = "async")]
mod tokio_scheduler;

pub use virtual_clock::VirtualClock;

#[cfg(feature = "async")]
pub use tokio_scheduler::TokioScheduler;

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce()>;

/// Opaque handle to a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "timer#{}", self.0)
    }
}

/// Runs tasks after a delay on the current thread.
///
/// Implementations run each task at most once, never concurrently with
/// other tasks of the same scheduler, and never after it was cancelled.
pub trait Scheduler {
    /// Arranges for `task` to run `delay` from now.
    fn schedule(&self, delay: Duration, task: Task) -> TimerId;

    /// Cancels a task that has not run yet.
    ///
    /// Returns `false` if the task already ran or was already cancelled.
    fn cancel(&self, timer: TimerId) -> bool;
}

impl<S: Scheduler + ?Sized> Scheduler for Rc<S> {
    fn schedule(&self, delay: Duration, task: Task) -> TimerId {
        (**self).schedule(delay, task)
    }

    fn cancel(&self, timer: TimerId) -> bool {
        (**self).cancel(timer)
    }
}
