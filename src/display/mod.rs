//! Output/input devices the render thread drives.

pub mod headless;
pub mod style;
pub mod terminal;

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::toolkit::{WidgetId, WidgetTree};

pub use headless::{HeadlessDisplay, HeadlessHandle};
pub use terminal::TerminalDisplay;

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("display I/O failed")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Next,
    Prev,
    Activate,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Touch (or click) in logical display coordinates.
    Touch { x: i32, y: i32 },
    Key(NavKey),
    /// The output surface changed size; everything must be redrawn.
    Resize,
    /// The window was closed. Ends the render loop normally.
    Close,
}

/// A display backend. Owned by the render thread.
pub trait Display: Send {
    /// Paint the whole tree. Called with the UI-state lock held.
    fn draw(&mut self, tree: &WidgetTree, focused: Option<WidgetId>) -> Result<(), DisplayError>;

    /// Wait up to `timeout` for the next input event. Called without the lock.
    fn wait_event(&mut self, timeout: Duration) -> Result<Option<InputEvent>, DisplayError>;
}

impl Display for Box<dyn Display> {
    fn draw(&mut self, tree: &WidgetTree, focused: Option<WidgetId>) -> Result<(), DisplayError> {
        (**self).draw(tree, focused)
    }

    fn wait_event(&mut self, timeout: Duration) -> Result<Option<InputEvent>, DisplayError> {
        (**self).wait_event(timeout)
    }
}
