//! A manually advanced clock.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use super::{Scheduler, Task, TimerId};

#[derive(Default)]
struct ClockState {
    now: Duration,
    next_id: u64,
    // Keyed by (deadline, id) so equal deadlines fire in scheduling order.
    queue: BTreeMap<(Duration, TimerId), Task>,
    deadlines: HashMap<TimerId, Duration>,
}

/// A deterministic [`Scheduler`] whose time only moves when told to.
///
/// Time starts at zero. [`VirtualClock::advance`] runs every task whose
/// deadline falls inside the advanced window, in deadline order, setting
/// [`VirtualClock::now`] to each task's deadline while it runs. Tasks may
/// schedule or cancel further tasks; those are honoured within the same
/// advance when their deadline is reached.
///
/// Cloning a `VirtualClock` yields another handle to the same clock.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
///
/// use fnadapt::timer::{Scheduler, VirtualClock};
///
/// let clock = VirtualClock::new();
/// let timer = clock.schedule(Duration::from_millis(10), Box::new(|| {}));
/// assert_eq!(clock.pending(), 1);
/// assert!(clock.cancel(timer));
/// assert_eq!(clock.advance(Duration::from_millis(20)), 0);
/// assert_eq!(clock.now(), Duration::from_millis(20));
/// ```
#[derive(Clone, Default)]
pub struct VirtualClock {
    state: Rc<RefCell<ClockState>>,
}

impl VirtualClock {
    /// Creates a clock at time zero with nothing scheduled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current virtual time.
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Returns the number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Returns the deadline of the next task, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.state
            .borrow()
            .queue
            .first_key_value()
            .map(|(&(deadline, _), _)| deadline)
    }

    /// Moves time forward by `by`, running every task that comes due.
    ///
    /// Time saturates at [`Duration::MAX`]. Returns the number of tasks that ran.
    pub fn advance(&self, by: Duration) -> usize {
        let until = self.now().saturating_add(by);
        let mut fired = 0;
        while let Some(task) = self.pop_due(until) {
            task();
            fired += 1;
        }
        self.state.borrow_mut().now = until;
        fired
    }

    /// Runs tasks until none are left, moving time to each deadline.
    ///
    /// Returns the number of tasks that ran. A task that keeps scheduling
    /// successors keeps this running.
    pub fn run_until_idle(&self) -> usize {
        let mut fired = 0;
        while let Some(deadline) = self.next_deadline() {
            fired += self.advance(deadline.saturating_sub(self.now()));
        }
        fired
    }

    fn pop_due(&self, until: Duration) -> Option<Task> {
        let mut state = self.state.borrow_mut();
        let (&(deadline, timer), _) = state.queue.first_key_value()?;
        if deadline > until {
            return None;
        }
        let task = state.queue.remove(&(deadline, timer))?;
        state.deadlines.remove(&timer);
        state.now = deadline;
        tracing::trace!(%timer, ?deadline, "virtual timer fired");
        Some(task)
    }
}

impl Scheduler for VirtualClock {
    fn schedule(&self, delay: Duration, task: Task) -> TimerId {
        let mut state = self.state.borrow_mut();
        let timer = TimerId::new(state.next_id);
        state.next_id += 1;
        let deadline = state.now.saturating_add(delay);
        state.queue.insert((deadline, timer), task);
        state.deadlines.insert(timer, deadline);
        timer
    }

    fn cancel(&self, timer: TimerId) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(deadline) = state.deadlines.remove(&timer) else {
            return false;
        };
        state.queue.remove(&(deadline, timer)).is_some()
    }
}

impl fmt::Debug for VirtualClock {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        formatter
            .debug_struct("VirtualClock")
            .field("now", &state.now)
            .field("pending", &state.queue.len())
            .finish()
    }
}
