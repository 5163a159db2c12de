use std::collections::BTreeMap;

use crate::world::World;

/// A one-shot action run on the simulation thread.
pub type Task = Box<dyn FnOnce(&mut World)>;

/// Defers work by a number of simulation ticks.
///
/// Tasks run exactly once, on the simulation thread. No cancellation handle
/// is exposed.
pub trait TaskScheduler {
    fn run_after(&mut self, delay_ticks: u64, task: Task);
}

/// Tick-keyed task queue driven by the host loop.
#[derive(Default)]
pub struct Scheduler {
    now: u64,
    queue: BTreeMap<u64, Vec<Task>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// A scheduler whose clock starts at `tick`.
    pub fn starting_at(tick: u64) -> Self {
        Self {
            now: tick,
            queue: BTreeMap::new(),
        }
    }

    /// Number of tasks not yet handed out.
    pub fn pending(&self) -> usize {
        self.queue.values().map(Vec::len).sum()
    }

    /// Move the clock to `tick` and hand out every task due at or before it,
    /// in due order, then submission order.
    pub fn advance(&mut self, tick: u64) -> Vec<Task> {
        self.now = tick;
        let later = self.queue.split_off(&tick.saturating_add(1));
        let due = std::mem::replace(&mut self.queue, later);
        due.into_values().flatten().collect()
    }
}

impl TaskScheduler for Scheduler {
    fn run_after(&mut self, delay_ticks: u64, task: Task) {
        let due = self.now.saturating_add(delay_ticks);
        tracing::trace!(now = self.now, due, "task scheduled");
        self.queue.entry(due).or_default().push(task);
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("now", &self.now)
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> Task {
        let log = Rc::clone(log);
        Box::new(move |_| log.borrow_mut().push(name))
    }

    #[test]
    fn task_waits_for_its_tick() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut s = Scheduler::new();
        s.run_after(20, recorder(&log, "fix"));

        let mut world = World::new();
        for tick in 1..20 {
            for task in s.advance(tick) {
                task(&mut world);
            }
        }
        assert!(log.borrow().is_empty());
        assert_eq!(s.pending(), 1);

        for task in s.advance(20) {
            task(&mut world);
        }
        assert_eq!(*log.borrow(), vec!["fix"]);
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn tasks_run_once() {
        let mut s = Scheduler::new();
        s.run_after(1, Box::new(|_| {}));
        assert_eq!(s.advance(1).len(), 1);
        assert!(s.advance(2).is_empty());
    }

    #[test]
    fn delay_is_relative_to_clock() {
        let mut s = Scheduler::starting_at(100);
        s.run_after(5, Box::new(|_| {}));
        assert!(s.advance(104).is_empty());
        assert_eq!(s.advance(105).len(), 1);
    }

    #[test]
    fn skipped_ticks_still_release_tasks() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut s = Scheduler::new();
        s.run_after(3, recorder(&log, "b"));
        s.run_after(2, recorder(&log, "a"));

        let mut world = World::new();
        for task in s.advance(10) {
            task(&mut world);
        }
        assert_eq!(*log.borrow(), vec!["a", "b"]);
    }
}
