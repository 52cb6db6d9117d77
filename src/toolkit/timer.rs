use std::fmt;

use super::widget::WidgetTree;

pub type TimerCallback = Box<dyn FnMut(&mut WidgetTree) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

struct Entry {
    id: TimerId,
    period_ms: u64,
    last_run_ms: u64,
    callback: TimerCallback,
}

impl Entry {
    fn due_at(&self) -> u64 {
        self.last_run_ms.saturating_add(self.period_ms)
    }
}

/// Recurring timers driven by the toolkit's millisecond time base.
#[derive(Default)]
pub struct Timers {
    next_id: u64,
    entries: Vec<Entry>,
}

impl Timers {
    /// Register a timer that fires every `period_ms`, first at `now_ms + period_ms`.
    pub fn create(&mut self, now_ms: u64, period_ms: u64, callback: TimerCallback) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            period_ms: period_ms.max(1),
            last_run_ms: now_ms,
            callback,
        });
        id
    }

    /// Returns `false` if the timer was already gone.
    pub fn delete(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fire every due timer once and return the milliseconds until the next
    /// one is due, or `None` when no timer is registered.
    pub fn run_due(&mut self, now_ms: u64, tree: &mut WidgetTree) -> Option<u64> {
        for entry in &mut self.entries {
            if now_ms >= entry.due_at() {
                entry.last_run_ms = now_ms;
                (entry.callback)(tree);
            }
        }
        self.entries
            .iter()
            .map(|e| e.due_at().saturating_sub(now_ms))
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn counting(counter: &Arc<AtomicU32>) -> TimerCallback {
        let counter = Arc::clone(counter);
        Box::new(move |_tree: &mut WidgetTree| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn fires_once_per_elapsed_period() {
        let mut timers = Timers::default();
        let mut tree = WidgetTree::new(1, 1);
        let fired = Arc::new(AtomicU32::new(0));
        timers.create(0, 1000, counting(&fired));

        assert_eq!(timers.run_due(999, &mut tree), Some(1));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(timers.run_due(1000, &mut tree), Some(1000));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        timers.run_due(1500, &mut tree);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn double_delete_is_harmless() {
        let mut timers = Timers::default();
        let id = timers.create(0, 10, Box::new(|_: &mut WidgetTree| {}));
        assert!(timers.delete(id));
        assert!(!timers.delete(id));
        assert!(timers.is_empty());
    }

    #[test]
    fn no_timers_means_no_deadline() {
        let mut timers = Timers::default();
        let mut tree = WidgetTree::new(1, 1);
        assert_eq!(timers.run_due(42, &mut tree), None);
    }
}
