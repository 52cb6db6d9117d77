use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::{Display, DisplayError, InputEvent, NavKey};
use crate::toolkit::{WidgetId, WidgetTree};

/// Display with no output surface. Input comes from a [`HeadlessHandle`].
pub struct HeadlessDisplay {
    events: Receiver<InputEvent>,
    frames: Arc<AtomicU64>,
    detached: bool,
}

/// Injects input into a [`HeadlessDisplay`] from any thread.
#[derive(Clone)]
pub struct HeadlessHandle {
    events: Sender<InputEvent>,
    frames: Arc<AtomicU64>,
}

impl HeadlessDisplay {
    /// A display and the handle that feeds it.
    pub fn pair() -> (Self, HeadlessHandle) {
        let (tx, rx) = mpsc::channel();
        let frames = Arc::new(AtomicU64::new(0));
        (
            Self { events: rx, frames: Arc::clone(&frames), detached: false },
            HeadlessHandle { events: tx, frames },
        )
    }
}

impl HeadlessHandle {
    fn send(&self, event: InputEvent) {
        // the render thread may already be gone
        let _ = self.events.send(event);
    }

    pub fn touch(&self, x: i32, y: i32) {
        self.send(InputEvent::Touch { x, y });
    }

    pub fn key(&self, key: NavKey) {
        self.send(InputEvent::Key(key));
    }

    pub fn close(&self) {
        self.send(InputEvent::Close);
    }

    /// Frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::SeqCst)
    }
}

impl Display for HeadlessDisplay {
    fn draw(&mut self, _tree: &WidgetTree, _focused: Option<WidgetId>) -> Result<(), DisplayError> {
        self.frames.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn wait_event(&mut self, timeout: Duration) -> Result<Option<InputEvent>, DisplayError> {
        if self.detached {
            thread::sleep(timeout);
            return Ok(None);
        }
        match self.events.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                // no handle left: behave like an idle panel from now on
                self.detached = true;
                Ok(None)
            }
        }
    }
}
