//! Touchscreen application shell for a bike computer.
//!
//! The interesting part is the screen-transition engine in [`ui`]: screen
//! requests from any thread are queued, drained by one manager thread and
//! applied under the lock the tick and render threads share.

pub mod app;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod display;
pub mod error;
pub mod fatal;
pub mod fifo;
pub mod logging;
pub mod screens;
pub mod toolkit;
pub mod ui;

pub use app::{
    apply_default_text_style, display_height, display_width, global, init,
    request_previous_screen, request_screen_change,
};
pub use error::UiError;
pub use ui::{Admission, Chrome, Navigator, Screen, ScreenCtx, ScreenId, ScreenRegistry, Ui, UiOptions};
