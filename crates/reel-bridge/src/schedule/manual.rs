use std::time::Duration;

use crate::schedule::timer::{Scheduler, TaskId};

/// A scheduler driven by hand. Time only moves when `advance` is called.
///
/// Used by tests and by hosts that pump their own clock.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u32,
    tasks: Vec<(TaskId, Duration)>,
    cancelled: u32,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward and return the tasks that came due, earliest
    /// first. Returned tasks are removed.
    pub fn advance(&mut self, by: Duration) -> Vec<TaskId> {
        self.now += by;
        let now = self.now;
        let mut due: Vec<(TaskId, Duration)> = Vec::new();
        self.tasks.retain(|&(id, at)| {
            if at <= now {
                due.push((id, at));
                false
            } else {
                true
            }
        });
        due.sort_by_key(|&(id, at)| (at, id.0));
        due.into_iter().map(|(id, _)| id).collect()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Number of cancel calls that removed a pending task.
    pub fn cancelled(&self) -> u32 {
        self.cancelled
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration) -> TaskId {
        self.next_id += 1;
        let id = TaskId(self.next_id);
        self.tasks.push((id, self.now + delay));
        id
    }

    fn cancel(&mut self, id: TaskId) {
        let before = self.tasks.len();
        self.tasks.retain(|&(pending, _)| pending != id);
        if self.tasks.len() != before {
            self.cancelled += 1;
        }
    }
}
