//! One-shot delayed tasks
//!
//! [`Scheduler`] is the only asynchronous primitive the engine uses besides the
//! inbound message channel. Dropping a [`TimerHandle`] leaves its task armed;
//! only [`TimerHandle::cancel`] stops it.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

pub type Task = Box<dyn FnOnce()>;

pub trait Scheduler {
    /// Run `task` once after `delay`
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle;
}

/// Handle to an armed task.
pub struct TimerHandle {
    id: u64,
    cancel: Option<Box<dyn FnOnce()>>,
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle").field("id", &self.id).finish()
    }
}

impl TimerHandle {
    pub fn new(id: u64, cancel: impl FnOnce() + 'static) -> Self {
        Self {
            id,
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Stop the task if it has not run yet
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

struct ScheduledTask {
    id: u64,
    due: Duration,
    task: Task,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_id: u64,
    tasks: Vec<ScheduledTask>,
}

/// Deterministic scheduler driven by a virtual clock.
///
/// Nothing runs until [`advance`](Self::advance) moves the clock past a task's
/// due time. Clones share the same clock and queue.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Rc<RefCell<ManualState>>,
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ManualScheduler")
            .field("now", &state.now)
            .field("pending", &state.tasks.len())
            .finish()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Tasks armed and not yet run or cancelled
    pub fn pending(&self) -> usize {
        self.state.borrow().tasks.len()
    }

    /// Move the clock forward, running due tasks in due order.
    ///
    /// Tasks armed by a running task also run if they fall due within the
    /// window. Returns how many tasks ran.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let mut ran = 0;
        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                let earliest = state
                    .tasks
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= target)
                    .min_by_key(|(_, t)| (t.due, t.id))
                    .map(|(i, _)| i);
                earliest.map(|i| {
                    let task = state.tasks.remove(i);
                    state.now = task.due;
                    task.task
                })
            };
            match next {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => break,
            }
        }
        self.state.borrow_mut().now = target;
        ran
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        let due = state.now + delay;
        state.tasks.push(ScheduledTask { id, due, task });

        let weak: Weak<RefCell<ManualState>> = Rc::downgrade(&self.state);
        TimerHandle::new(id, move || {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().tasks.retain(|t| t.id != id);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn tasks_run_only_when_due() {
        let scheduler = ManualScheduler::new();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let _handle = scheduler.schedule(
            Duration::from_millis(3000),
            Box::new(move || counter.set(counter.get() + 1)),
        );

        assert_eq!(scheduler.advance(Duration::from_millis(2999)), 0);
        assert_eq!(hits.get(), 0);
        assert_eq!(scheduler.advance(Duration::from_millis(1)), 1);
        assert_eq!(hits.get(), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn dropping_handle_keeps_task_armed() {
        let scheduler = ManualScheduler::new();
        drop(scheduler.schedule(Duration::from_millis(10), Box::new(|| {})));
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.advance(Duration::from_millis(10)), 1);
    }

    #[test]
    fn cancel_removes_task() {
        let scheduler = ManualScheduler::new();
        let handle = scheduler.schedule(Duration::from_millis(10), Box::new(|| {}));
        handle.cancel();
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.advance(Duration::from_secs(1)), 0);
    }

    #[test]
    fn tasks_run_in_due_order() {
        let scheduler = ManualScheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for (label, ms) in [("late", 30), ("early", 10), ("mid", 20)] {
            let order = order.clone();
            let _ = scheduler.schedule(
                Duration::from_millis(ms),
                Box::new(move || order.borrow_mut().push(label)),
            );
        }
        scheduler.advance(Duration::from_millis(100));
        assert_eq!(*order.borrow(), vec!["early", "mid", "late"]);
        assert_eq!(scheduler.now(), Duration::from_millis(100));
    }
}
