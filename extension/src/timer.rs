//! `setTimeout`-backed scheduler

use std::cell::Cell;
use std::time::Duration;

use gallery_wall_core::lifecycle::Task;
use gallery_wall_core::{Scheduler, TimerHandle};
use gloo_timers::callback::Timeout;
use tracing::debug;

#[derive(Default)]
pub struct BrowserScheduler {
    next_id: Cell<u64>,
}

impl BrowserScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for BrowserScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        // The browser owns the callback once forgotten; the returned id is
        // the only way to clear it.
        let timeout_id = Timeout::new(millis, task).forget();

        TimerHandle::new(id, move || {
            if let (Some(window), Some(handle)) = (web_sys::window(), timeout_id.as_f64()) {
                window.clear_timeout_with_handle(handle as i32);
                debug!(id, "cleared settle timer");
            }
        })
    }
}
