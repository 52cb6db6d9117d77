//! The process-wide UI instance and the binary's run loop.

use std::sync::{Mutex, OnceLock, PoisonError};
use std::thread;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Settings;
use crate::display::{terminal::restore_terminal, Display, HeadlessDisplay, TerminalDisplay};
use crate::error::UiError;
use crate::fatal;
use crate::screens;
use crate::toolkit::WidgetId;
use crate::ui::{Admission, ScreenId, ScreenRegistry, Ui, UiOptions};

static INSTANCE: OnceLock<Ui> = OnceLock::new();
static INIT: Mutex<()> = Mutex::new(());

/// Create the process-wide UI. A second call fails with `AlreadyInitialized`
/// and leaves the running instance alone.
pub fn init<D>(options: UiOptions, registry: ScreenRegistry, display: D) -> Result<&'static Ui, UiError>
where
    D: Display + 'static,
{
    let _serialized = INIT.lock().unwrap_or_else(PoisonError::into_inner);
    if INSTANCE.get().is_some() {
        return Err(UiError::AlreadyInitialized);
    }
    let ui = Ui::init(options, registry, display)?;
    Ok(INSTANCE.get_or_init(|| ui))
}

pub fn global() -> Result<&'static Ui, UiError> {
    INSTANCE.get().ok_or(UiError::NotInitialized)
}

pub fn display_width() -> Result<i32, UiError> {
    Ok(global()?.display_width())
}

pub fn display_height() -> Result<i32, UiError> {
    Ok(global()?.display_height())
}

pub fn request_screen_change(id: ScreenId) -> Result<Admission, UiError> {
    global()?.request_screen_change(id)
}

pub fn request_previous_screen() -> Result<Admission, UiError> {
    global()?.request_previous_screen()
}

/// Fails with `LockHeld` when called from a screen callback; screens use
/// their `ScreenCtx` for this.
pub fn apply_default_text_style(id: WidgetId) -> Result<(), UiError> {
    global()?.apply_default_text_style(id)
}

/// Run the shell until the window is closed.
pub fn run(settings: Settings) -> Result<()> {
    let registry = screens::default_registry(&settings.device_name);

    let ui = if settings.headless {
        let (display, handle) = HeadlessDisplay::pair();
        let ui = init(settings.ui, registry, display).context("starting the ui")?;
        if let Some(after) = settings.exit_after {
            thread::Builder::new()
                .name("exit-timer".into())
                .spawn(move || {
                    thread::sleep(after);
                    handle.close();
                })
                .context("spawning the exit timer")?;
        }
        ui
    } else {
        fatal::on_terminate(restore_terminal);
        let geometry = settings.ui.geometry()?;
        let display = TerminalDisplay::new(geometry.width, geometry.height)
            .context("opening the terminal")?;
        init(settings.ui, registry, display).context("starting the ui")?
    };

    ui.wait_closed();
    ui.shutdown();
    info!("window closed, bye");
    Ok(())
}
