//! Timers backed by the tokio runtime.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::{Scheduler, Task, TimerId};

#[derive(Default)]
struct Registry {
    next_id: u64,
    handles: HashMap<TimerId, JoinHandle<()>>,
}

/// A [`Scheduler`] that runs tasks on the current tokio `LocalSet`.
///
/// Each scheduled task becomes a [`tokio::task::spawn_local`] task sleeping
/// on [`tokio::time::sleep`]; cancelling aborts it. Because tasks are spawned
/// locally, the scheduler must be used from inside a
/// [`tokio::task::LocalSet`], and the tasks themselves need not be `Send`.
///
/// Under a paused test clock (`#[tokio::test(start_paused = true)]`) the
/// timers fire as soon as the runtime has nothing else to do.
///
/// # Panics
///
/// [`Scheduler::schedule`] panics when called outside a `LocalSet`, as
/// `spawn_local` does.
///
/// # Examples
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use std::time::Duration;
///
/// use fnadapt::timer::{Scheduler, TokioScheduler};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let local = tokio::task::LocalSet::new();
/// local
///     .run_until(async {
///         let scheduler = TokioScheduler::new();
///         let fired = Rc::new(Cell::new(false));
///         let flag = Rc::clone(&fired);
///         scheduler.schedule(Duration::from_millis(5), Box::new(move || flag.set(true)));
///         tokio::time::sleep(Duration::from_millis(20)).await;
///         assert!(fired.get());
///     })
///     .await;
/// # }
/// ```
#[derive(Clone, Default)]
pub struct TokioScheduler {
    registry: Rc<RefCell<Registry>>,
}

impl TokioScheduler {
    /// Creates a scheduler with nothing scheduled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.registry.borrow().handles.len()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerId {
        let mut registry = self.registry.borrow_mut();
        let timer = TimerId::new(registry.next_id);
        registry.next_id += 1;
        let weak_registry = Rc::downgrade(&self.registry);
        let handle = tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            if let Some(registry) = weak_registry.upgrade() {
                registry.borrow_mut().handles.remove(&timer);
            }
            tracing::trace!(%timer, "tokio timer fired");
            task();
        });
        registry.handles.insert(timer, handle);
        timer
    }

    fn cancel(&self, timer: TimerId) -> bool {
        let handle = self.registry.borrow_mut().handles.remove(&timer);
        handle.is_some_and(|handle| {
            handle.abort();
            true
        })
    }
}

impl fmt::Debug for TokioScheduler {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("TokioScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}
