use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use super::ScreenId;
use crate::error::UiError;
use crate::fifo::{BoundedQueue, QueueError};

/// Which screen is showing and which one showed before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenHistory {
    pub current: ScreenId,
    pub previous: ScreenId,
}

/// Result of an accepted screen request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Queued for the screen manager.
    Queued,
    /// Already the current screen; nothing was queued.
    AlreadyCurrent,
}

struct Transitions {
    queue: BoundedQueue<ScreenId>,
    history: Mutex<ScreenHistory>,
}

/// Cheap handle for requesting screen changes from any thread.
///
/// Never touches the UI-state lock, so it is safe to use from click handlers
/// and timers that run while that lock is held.
#[derive(Clone)]
pub struct Navigator {
    inner: Arc<Transitions>,
}

impl Navigator {
    pub(crate) fn new(queue_depth: usize, initial: ScreenId) -> Result<Self, QueueError> {
        Ok(Self {
            inner: Arc::new(Transitions {
                queue: BoundedQueue::new(queue_depth)?,
                history: Mutex::new(ScreenHistory { current: initial, previous: initial }),
            }),
        })
    }

    fn history_lock(&self) -> MutexGuard<'_, ScreenHistory> {
        self.inner.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn history(&self) -> ScreenHistory {
        *self.history_lock()
    }

    pub fn current_screen(&self) -> ScreenId {
        self.history().current
    }

    pub fn previous_screen(&self) -> ScreenId {
        self.history().previous
    }

    /// Ask for `id` to be shown. Never blocks; a saturated queue is reported
    /// as `UiError::Queue(QueueError::Full)` and the caller decides whether to retry.
    pub fn request_screen_change(&self, id: ScreenId) -> Result<Admission, UiError> {
        if id == self.current_screen() {
            debug!(screen = %id, "screen already displayed, nothing to do");
            return Ok(Admission::AlreadyCurrent);
        }
        info!(screen = %id, "new screen requested");
        self.enqueue(id)?;
        Ok(Admission::Queued)
    }

    /// Same as [`request_screen_change`](Self::request_screen_change) for a raw index.
    pub fn request_screen_index(&self, raw: usize) -> Result<Admission, UiError> {
        let id = ScreenId::try_from(raw).map_err(|e| {
            warn!(raw, "rejecting request for unknown screen");
            e
        })?;
        self.request_screen_change(id)
    }

    /// Ask for the previously displayed screen.
    ///
    /// `previous` is read without waiting for a transition that may be in
    /// flight, so the target can be one transition stale. Like any other
    /// request it is dropped as `AlreadyCurrent` when `previous` is the
    /// screen on display, as it is right after start-up.
    pub fn request_previous_screen(&self) -> Result<Admission, UiError> {
        let target = self.previous_screen();
        self.request_screen_change(target)
    }

    /// Requests waiting for the screen manager.
    pub fn pending(&self) -> usize {
        self.inner.queue.len()
    }

    pub(crate) fn enqueue(&self, id: ScreenId) -> Result<(), UiError> {
        self.inner.queue.push(id).map_err(|e| {
            warn!(screen = %id, error = %e, "queueing screen request failed");
            UiError::from(e)
        })
    }

    pub(crate) fn queue(&self) -> &BoundedQueue<ScreenId> {
        &self.inner.queue
    }

    pub(crate) fn close(&self) {
        self.inner.queue.close();
    }

    /// Record a completed transition to `next`.
    pub(crate) fn commit(&self, next: ScreenId) -> ScreenHistory {
        let mut history = self.history_lock();
        history.previous = history.current;
        history.current = next;
        *history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_screen_request_is_a_no_op() {
        let nav = Navigator::new(4, ScreenId::Main).unwrap();
        assert_eq!(nav.request_screen_change(ScreenId::Main).unwrap(), Admission::AlreadyCurrent);
        assert_eq!(nav.pending(), 0);
    }

    #[test]
    fn invalid_index_never_reaches_the_queue() {
        let nav = Navigator::new(4, ScreenId::Main).unwrap();
        assert!(matches!(
            nav.request_screen_index(ScreenId::COUNT + 3),
            Err(UiError::InvalidScreen(_))
        ));
        assert_eq!(nav.pending(), 0);
        assert_eq!(nav.request_screen_index(1).unwrap(), Admission::Queued);
        assert_eq!(nav.queue().try_pop(), Ok(ScreenId::Data));
    }

    #[test]
    fn full_queue_is_reported_not_blocked_on() {
        let nav = Navigator::new(1, ScreenId::Main).unwrap();
        nav.request_screen_change(ScreenId::Data).unwrap();
        assert!(matches!(
            nav.request_screen_change(ScreenId::Routes),
            Err(UiError::Queue(QueueError::Full))
        ));
        assert_eq!(nav.pending(), 1);
    }

    #[test]
    fn commit_shifts_current_into_previous() {
        let nav = Navigator::new(4, ScreenId::Main).unwrap();
        nav.commit(ScreenId::Data);
        let h = nav.commit(ScreenId::Settings);
        assert_eq!(h, ScreenHistory { current: ScreenId::Settings, previous: ScreenId::Data });
    }

    #[test]
    fn previous_request_at_start_up_is_a_no_op() {
        let nav = Navigator::new(4, ScreenId::Main).unwrap();
        assert_eq!(nav.previous_screen(), nav.current_screen());
        assert_eq!(nav.request_previous_screen().unwrap(), Admission::AlreadyCurrent);
        assert_eq!(nav.pending(), 0);

        nav.commit(ScreenId::Data);
        nav.commit(ScreenId::Data);
        assert_eq!(nav.request_previous_screen().unwrap(), Admission::AlreadyCurrent);
        assert_eq!(nav.pending(), 0);
    }

    #[test]
    fn previous_request_targets_the_recorded_previous_screen() {
        let nav = Navigator::new(4, ScreenId::Main).unwrap();
        nav.commit(ScreenId::Profile);
        nav.commit(ScreenId::Rider);
        assert_eq!(nav.request_previous_screen().unwrap(), Admission::Queued);
        assert_eq!(nav.queue().try_pop(), Ok(ScreenId::Profile));
    }
}
