use std::time::Duration;

/// Handle for one scheduled task. Unique per scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u32);

/// One-shot delayed tasks on the UI event loop.
///
/// The scheduler only reports *which* task is due; the owner of the task
/// decides what it means when its `on_timer(id)` is called.
pub trait Scheduler {
    /// Arrange for `id` to come due after `delay`.
    fn schedule(&mut self, delay: Duration) -> TaskId;

    /// Forget a pending task. Cancelling an unknown or fired task is a no-op.
    fn cancel(&mut self, id: TaskId);

    /// Told when `id` came due, so the scheduler can release what it holds
    /// for it.
    fn fired(&mut self, _id: TaskId) {}
}

/// Pending tasks owned by one component, tagged with what they are for.
///
/// Teardown calls `cancel_all` so nothing fires into a dead component.
#[derive(Debug)]
pub struct TimerSet<K> {
    pending: Vec<(TaskId, K)>,
}

impl<K: Copy + PartialEq> TimerSet<K> {
    pub fn new() -> Self {
        Self {
            pending: Vec::with_capacity(2),
        }
    }

    pub fn schedule(&mut self, scheduler: &mut dyn Scheduler, delay: Duration, kind: K) -> TaskId {
        let id = scheduler.schedule(delay);
        self.pending.push((id, kind));
        id
    }

    /// Claim a task that came due. `None` if it is not ours or was cancelled.
    pub fn fire(&mut self, id: TaskId) -> Option<K> {
        let index = self.pending.iter().position(|(pending, _)| *pending == id)?;
        Some(self.pending.swap_remove(index).1)
    }

    pub fn cancel_all(&mut self, scheduler: &mut dyn Scheduler) {
        for (id, _) in self.pending.drain(..) {
            scheduler.cancel(id);
        }
    }

    pub fn is_pending(&self, kind: K) -> bool {
        self.pending.iter().any(|(_, k)| *k == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

impl<K: Copy + PartialEq> Default for TimerSet<K> {
    fn default() -> Self {
        Self::new()
    }
}
