//! Single-threaded event loop with a virtual clock.
//!
//! Tasks are one-shot closures ordered by deadline, ties broken by the
//! order they were scheduled in. Time only moves when the owner advances
//! it, which makes timer behaviour fully deterministic under test; a
//! real-time driver simply sleeps until `next_deadline()` and advances.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

type Task = Box<dyn FnOnce()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId {
    due: Duration,
    seq: u64,
}

impl TaskId {
    pub fn due(&self) -> Duration {
        self.due
    }
}

#[derive(Default)]
struct Queue {
    now: Duration,
    seq: u64,
    tasks: BTreeMap<TaskId, Task>,
}

#[derive(Clone, Default)]
pub struct Scheduler {
    inner: Rc<RefCell<Queue>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    pub fn schedule(&self, delay: Duration, task: impl FnOnce() + 'static) -> TaskId {
        let mut queue = self.inner.borrow_mut();
        queue.seq += 1;
        let id = TaskId {
            due: queue.now + delay,
            seq: queue.seq,
        };
        queue.tasks.insert(id, Box::new(task));
        id
    }

    /// Removes a pending task. Returns false when it already ran or was cancelled.
    pub fn cancel(&self, id: TaskId) -> bool {
        self.inner.borrow_mut().tasks.remove(&id).is_some()
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.inner.borrow().tasks.contains_key(&id)
    }

    pub fn pending(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.inner.borrow().tasks.keys().next().map(|id| id.due)
    }

    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        self.advance_to(target)
    }

    /// Runs every task due at or before `target`, in deadline order, then
    /// leaves the clock at `target`. Tasks scheduled by running tasks are
    /// picked up in the same pass when they fall due in time. Returns the
    /// number of tasks run.
    pub fn advance_to(&self, target: Duration) -> usize {
        let mut ran = 0;
        loop {
            // The borrow must end before the task runs: tasks reschedule.
            let next = {
                let mut queue = self.inner.borrow_mut();
                match queue.tasks.first_key_value() {
                    Some((id, _)) if id.due <= target => {
                        let id = *id;
                        queue.now = queue.now.max(id.due);
                        queue.tasks.remove(&id)
                    }
                    _ => None,
                }
            };
            match next {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => break,
            }
        }
        let mut queue = self.inner.borrow_mut();
        queue.now = queue.now.max(target);
        ran
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let queue = self.inner.borrow();
        f.debug_struct("Scheduler")
            .field("now", &queue.now)
            .field("pending", &queue.tasks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn tasks_run_in_deadline_then_schedule_order() {
        let scheduler = Scheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (delay, tag) in [(20, "c"), (10, "a"), (10, "b")] {
            let log = log.clone();
            scheduler.schedule(Duration::from_millis(delay), move || log.borrow_mut().push(tag));
        }
        assert_eq!(scheduler.advance(Duration::from_millis(20)), 3);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(scheduler.now(), Duration::from_millis(20));
    }

    #[test]
    fn cancelled_task_never_runs() {
        let scheduler = Scheduler::new();
        let hit = Rc::new(RefCell::new(false));
        let flag = hit.clone();
        let id = scheduler.schedule(Duration::from_millis(5), move || *flag.borrow_mut() = true);
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        scheduler.advance(Duration::from_millis(50));
        assert!(!*hit.borrow());
    }

    #[test]
    fn task_scheduled_while_running_fires_in_same_advance() {
        let scheduler = Scheduler::new();
        let count = Rc::new(RefCell::new(0));
        let inner_scheduler = scheduler.clone();
        let inner_count = count.clone();
        scheduler.schedule(Duration::from_millis(10), move || {
            *inner_count.borrow_mut() += 1;
            let c = inner_count.clone();
            inner_scheduler.schedule(Duration::from_millis(10), move || *c.borrow_mut() += 1);
        });
        scheduler.advance(Duration::from_millis(25));
        assert_eq!(*count.borrow(), 2);
        assert_eq!(scheduler.next_deadline(), None);
    }
}
