use std::io;

use thiserror::Error;

use crate::display::DisplayError;
use crate::fifo::QueueError;
use crate::toolkit::ToolkitError;
use crate::ui::ScreenId;

#[derive(Debug, Error)]
pub enum UiError {
    #[error("ui is already initialized")]
    AlreadyInitialized,
    #[error("ui is not initialized")]
    NotInitialized,
    #[error("invalid screen id {0}")]
    InvalidScreen(usize),
    #[error("invalid screen rotation {0}, expected 0, 90, 180 or 270")]
    InvalidRotation(i32),
    #[error("invalid display resolution {width}x{height}")]
    InvalidResolution { width: i32, height: i32 },
    #[error("the ui lock is already held by this thread; use the screen context instead")]
    LockHeld,
    #[error("no screen registered for {0}")]
    ScreenNotRegistered(ScreenId),
    #[error("creating the {name} thread failed")]
    Spawn {
        name: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("transition queue: {0}")]
    Queue(#[from] QueueError),
    #[error(transparent)]
    Toolkit(#[from] ToolkitError),
    #[error(transparent)]
    Display(#[from] DisplayError),
}
