//! The status bar shown above screens that ask for chrome: a clock label
//! refreshed by a toolkit timer and an optional back button.

use time::macros::format_description;
use time::OffsetDateTime;
use tracing::{debug, warn};

use super::navigator::Navigator;
use super::ScreenId;
use crate::defaults::Defaults;
use crate::toolkit::{
    Rect, Rgb, TimerId, Toolkit, ToolkitError, WidgetKind, WidgetStyle, WidgetTree, WidgetId,
};

const BAR_BACKGROUND: Rgb = Rgb::hex(0x202020);
const BATTERY: &str = "▮▮▮";
const BACK_TEXT: &str = "< Back";

fn clock_text() -> String {
    // the local offset is unavailable on some multi-threaded platforms
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    match now.format(format_description!("[hour]:[minute]")) {
        Ok(hhmm) => format!("{BATTERY} {hhmm}"),
        Err(e) => {
            warn!(error = %e, "formatting status bar clock failed");
            format!("{BATTERY} --:--")
        }
    }
}

#[derive(Debug, Default)]
pub struct StatusBar {
    bar: Option<WidgetId>,
    label: Option<WidgetId>,
    back_button: Option<WidgetId>,
    timer: Option<TimerId>,
}

impl StatusBar {
    pub fn height(display_height: i32) -> i32 {
        display_height / 10
    }

    pub fn build(
        toolkit: &mut Toolkit,
        width: i32,
        display_height: i32,
        back: Option<ScreenId>,
        nav: &Navigator,
    ) -> Result<Self, ToolkitError> {
        let height = Self::height(display_height);
        let root = toolkit.root();
        let mut built = StatusBar::default();

        let bar = toolkit.create(root, WidgetKind::Container, Rect::new(0, 0, width, height))?;
        toolkit.tree_mut().set_style(
            bar,
            WidgetStyle { background: Some(BAR_BACKGROUND), ..WidgetStyle::default() },
        )?;
        built.bar = Some(bar);

        if let Some(target) = back {
            let (w, h) = (width * 35 / 100, height * 90 / 100);
            let nav = nav.clone();
            let button = toolkit.create(
                bar,
                WidgetKind::button(move || {
                    if let Err(e) = nav.request_screen_change(target) {
                        warn!(screen = %target, error = %e, "back button request failed");
                    }
                }),
                Rect::new(0, (height - h) / 2, w, h),
            )?;
            let text = toolkit.create(button, WidgetKind::label(BACK_TEXT), Rect::sized(w, h))?;
            toolkit.apply_default_text_style(text)?;
            built.back_button = Some(button);
        }

        let label_w = width / 4;
        let label = toolkit.create(
            bar,
            WidgetKind::label(clock_text()),
            Rect::new(width - label_w, 0, label_w, height),
        )?;
        toolkit.apply_default_text_style(label)?;
        built.label = Some(label);

        let timer = toolkit.create_timer(Defaults::STATUS_BAR_CLOCK_PERIOD, move |tree: &mut WidgetTree| {
            if let Err(e) = tree.set_text(label, clock_text()) {
                warn!(error = %e, "status bar clock update failed");
            }
        });
        built.timer = Some(timer);

        debug!(back = ?back, "status bar built");
        Ok(built)
    }

    /// Delete the clock timer and the bar widgets. Safe to repeat, and safe on
    /// a bar that was never built.
    pub fn destroy(&mut self, toolkit: &mut Toolkit) {
        if let Some(timer) = self.timer.take() {
            toolkit.delete_timer(timer);
        }
        if let Some(bar) = self.bar.take() {
            if toolkit.tree().contains(bar) {
                // the bar owns the label and the back button
                let _ = toolkit.tree_mut().delete(bar);
            }
        }
        self.label = None;
        self.back_button = None;
    }

    pub fn is_built(&self) -> bool {
        self.bar.is_some()
    }

    pub fn timer(&self) -> Option<TimerId> {
        self.timer
    }

    pub fn back_button(&self) -> Option<WidgetId> {
        self.back_button
    }

    pub fn label(&self) -> Option<WidgetId> {
        self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::TextStyle;

    fn setup() -> (Toolkit, Navigator) {
        (
            Toolkit::new(1000, 800, TextStyle::default()),
            Navigator::new(4, ScreenId::Data).unwrap(),
        )
    }

    #[test]
    fn builds_bar_clock_and_back_button() {
        let (mut tk, nav) = setup();
        let bar = StatusBar::build(&mut tk, 1000, 800, Some(ScreenId::Main), &nav).unwrap();

        assert!(bar.is_built());
        assert_eq!(tk.timer_count(), 1);
        let button = bar.back_button().unwrap();
        assert_eq!(tk.tree().absolute_rect(button).unwrap(), Rect::new(0, 4, 350, 72));
        let label = tk.tree().get(bar.label().unwrap()).unwrap();
        assert!(label.text().unwrap().starts_with(BATTERY));

        (tk.tree().click_handler(button).unwrap())();
        assert_eq!(nav.pending(), 1);
    }

    #[test]
    fn largest_accepted_display_builds() {
        let (mut tk, nav) = setup();
        let side = Defaults::MAX_DISPLAY_DIM;
        let bar = StatusBar::build(&mut tk, side, side, Some(ScreenId::Main), &nav).unwrap();
        let button = bar.back_button().unwrap();
        assert_eq!(tk.tree().absolute_rect(button).unwrap().width, side * 35 / 100);
    }

    #[test]
    fn no_back_button_unless_asked() {
        let (mut tk, nav) = setup();
        let bar = StatusBar::build(&mut tk, 1000, 800, None, &nav).unwrap();
        assert_eq!(bar.back_button(), None);
        assert!(tk.tree().buttons().is_empty());
    }

    #[test]
    fn destroy_is_idempotent() {
        let (mut tk, nav) = setup();
        let mut bar = StatusBar::build(&mut tk, 1000, 800, None, &nav).unwrap();
        let clock = bar.timer().unwrap();
        assert!(tk.has_timer(clock));
        bar.destroy(&mut tk);
        bar.destroy(&mut tk);
        assert!(!tk.has_timer(clock));
        assert_eq!(bar.timer(), None);
        assert_eq!(tk.timer_count(), 0);
        assert!(tk.tree().is_empty());

        let mut never_built = StatusBar::default();
        never_built.destroy(&mut tk);
    }

    #[test]
    fn destroy_after_the_tree_was_cleaned() {
        let (mut tk, nav) = setup();
        let mut bar = StatusBar::build(&mut tk, 1000, 800, Some(ScreenId::Main), &nav).unwrap();
        tk.clean_root();
        bar.destroy(&mut tk);
        assert_eq!(tk.timer_count(), 0);
    }

    #[test]
    fn clock_timer_rewrites_the_label() {
        let (mut tk, nav) = setup();
        let bar = StatusBar::build(&mut tk, 1000, 800, None, &nav).unwrap();
        let label = bar.label().unwrap();
        tk.tree_mut().set_text(label, "stale").unwrap();

        tk.tick_inc(Defaults::STATUS_BAR_CLOCK_PERIOD);
        tk.timer_handler();
        assert_ne!(tk.tree().get(label).unwrap().text(), Some("stale"));
    }
}
