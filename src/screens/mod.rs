//! Built-in screens of the bike computer.

pub mod data;
pub mod info;
pub mod main_menu;
pub mod profile;
pub mod settings;

use anyhow::Result;
use tracing::warn;

use crate::defaults::Defaults;
use crate::toolkit::{Rect, Rgb, WidgetId, WidgetKind, WidgetStyle};
use crate::ui::{Chrome, Navigator, ScreenCtx, ScreenId, ScreenRegistry};

pub use data::DataScreen;
pub use info::InfoScreen;
pub use main_menu::MainMenuScreen;
pub use profile::ProfileScreen;
pub use settings::SettingsScreen;

/// Every built-in screen with its chrome.
pub fn default_registry(device_name: &str) -> ScreenRegistry {
    let to_main = Chrome::back_to(ScreenId::Main);
    ScreenRegistry::new()
        .register(ScreenId::Main, Chrome::BAR, MainMenuScreen)
        .register(ScreenId::Data, to_main, DataScreen::default())
        .register(ScreenId::Navigation, Chrome::HIDDEN, InfoScreen::navigation())
        .register(ScreenId::Results, to_main, InfoScreen::results())
        .register(ScreenId::Routes, to_main, InfoScreen::routes())
        .register(ScreenId::Profile, to_main, ProfileScreen)
        .register(ScreenId::Bike, Chrome::HIDDEN, InfoScreen::bike())
        .register(ScreenId::Rider, Chrome::HIDDEN, InfoScreen::rider())
        .register(ScreenId::Settings, to_main, SettingsScreen::new(device_name))
}

impl ScreenRegistry {
    pub fn with_defaults() -> Self {
        default_registry(Defaults::DEVICE_NAME)
    }
}

/* ---------- shared building blocks ---------- */

/// Click handler asking for `target`.
pub(crate) fn goto(nav: &Navigator, target: ScreenId) -> impl Fn() + Send + Sync + 'static {
    let nav = nav.clone();
    move || {
        if let Err(e) = nav.request_screen_change(target) {
            warn!(screen = %target, error = %e, "screen request failed");
        }
    }
}

/// Click handler asking for whatever was shown before.
pub(crate) fn go_back(nav: &Navigator) -> impl Fn() + Send + Sync + 'static {
    let nav = nav.clone();
    move || {
        if let Err(e) = nav.request_previous_screen() {
            warn!(error = %e, "back request failed");
        }
    }
}

/// A button with a centered caption, if `caption` is not empty.
pub(crate) fn button(
    ctx: &mut ScreenCtx<'_>,
    parent: WidgetId,
    rect: Rect,
    caption: &str,
    background: Option<Rgb>,
    on_click: impl Fn() + Send + Sync + 'static,
) -> Result<WidgetId> {
    let button = ctx.create(parent, WidgetKind::button(on_click), rect)?;
    if background.is_some() {
        ctx.toolkit()
            .tree_mut()
            .set_style(button, WidgetStyle { background, ..WidgetStyle::default() })?;
    }
    if !caption.is_empty() {
        label(ctx, button, Rect::sized(rect.width, rect.height), caption)?;
    }
    Ok(button)
}

/// A label using the default text style.
pub(crate) fn label(
    ctx: &mut ScreenCtx<'_>,
    parent: WidgetId,
    rect: Rect,
    text: &str,
) -> Result<WidgetId> {
    let label = ctx.create(parent, WidgetKind::label(text), rect)?;
    ctx.apply_default_text_style(label)?;
    Ok(label)
}
