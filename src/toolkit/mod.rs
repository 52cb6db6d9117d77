//! Minimal retained-mode UI toolkit: a widget tree, a millisecond time base
//! and recurring timers.
//!
//! Nothing in here is thread-safe on its own. The shell keeps one `Toolkit`
//! behind the UI-state lock and every thread goes through that lock.

pub mod geometry;
pub mod timer;
pub mod widget;

use std::time::Duration;

use thiserror::Error;

pub use geometry::Rect;
pub use timer::{TimerCallback, TimerId};
pub use widget::{
    ClickHandler, FontSize, Node, Rgb, TextStyle, WidgetId, WidgetKind, WidgetStyle, WidgetTree,
};

use timer::Timers;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolkitError {
    #[error("widget {0} does not exist (deleted or never created)")]
    StaleWidget(WidgetId),
    #[error("widget {0} is not a label")]
    NotALabel(WidgetId),
    #[error("the root widget cannot be deleted")]
    RootWidget,
    #[error("widget arena exhausted")]
    Exhausted,
}

pub struct Toolkit {
    tree: WidgetTree,
    timers: Timers,
    now_ms: u64,
    focused: Option<WidgetId>,
    default_text_style: TextStyle,
}

impl Toolkit {
    pub fn new(width: i32, height: i32, default_text_style: TextStyle) -> Self {
        Self {
            tree: WidgetTree::new(width, height),
            timers: Timers::default(),
            now_ms: 0,
            focused: None,
            default_text_style,
        }
    }

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut WidgetTree {
        &mut self.tree
    }

    pub fn root(&self) -> WidgetId {
        self.tree.root()
    }

    /// Advance the time base. Called by the tick thread.
    pub fn tick_inc(&mut self, elapsed: Duration) {
        let ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.now_ms = self.now_ms.saturating_add(ms);
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Run due timers; returns the delay until the next timer is due.
    pub fn timer_handler(&mut self) -> Option<Duration> {
        self.timers
            .run_due(self.now_ms, &mut self.tree)
            .map(Duration::from_millis)
    }

    pub fn create_timer(
        &mut self,
        period: Duration,
        callback: impl FnMut(&mut WidgetTree) + Send + 'static,
    ) -> TimerId {
        let period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX);
        self.timers.create(self.now_ms, period_ms, Box::new(callback))
    }

    /// Safe to call on an already deleted timer; returns whether it existed.
    pub fn delete_timer(&mut self, id: TimerId) -> bool {
        self.timers.delete(id)
    }

    pub fn has_timer(&self, id: TimerId) -> bool {
        self.timers.contains(id)
    }

    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    pub fn create(
        &mut self,
        parent: WidgetId,
        kind: WidgetKind,
        rect: Rect,
    ) -> Result<WidgetId, ToolkitError> {
        self.tree.create(parent, kind, rect)
    }

    /// Remove every widget under the root.
    pub fn clean_root(&mut self) {
        let root = self.tree.root();
        // the root is always live
        let _ = self.tree.clean(root);
        self.focused = None;
    }

    pub fn default_text_style(&self) -> TextStyle {
        self.default_text_style
    }

    pub fn apply_default_text_style(&mut self, id: WidgetId) -> Result<(), ToolkitError> {
        self.tree.set_text_style(id, self.default_text_style)
    }

    /* ---------- keyboard focus ---------- */

    pub fn focused(&self) -> Option<WidgetId> {
        self.focused.filter(|id| self.tree.contains(*id))
    }

    pub fn set_focus(&mut self, id: Option<WidgetId>) {
        self.focused = id;
        self.tree.invalidate();
    }

    /// Move focus `step` buttons forward (negative for backward), wrapping.
    pub fn move_focus(&mut self, step: isize) {
        let buttons = self.tree.buttons();
        if buttons.is_empty() {
            self.set_focus(None);
            return;
        }
        let len = buttons.len() as isize;
        let next = match self.focused().and_then(|f| buttons.iter().position(|b| *b == f)) {
            Some(pos) => (pos as isize + step).rem_euclid(len),
            None if step < 0 => len - 1,
            None => 0,
        };
        self.set_focus(Some(buttons[next as usize]));
    }

    /// The click handler of the focused button, if any.
    pub fn focused_handler(&self) -> Option<ClickHandler> {
        self.focused().and_then(|id| self.tree.click_handler(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toolkit() -> Toolkit {
        Toolkit::new(100, 100, TextStyle::default())
    }

    #[test]
    fn timers_follow_the_tick_not_the_wall_clock() {
        let mut tk = toolkit();
        let root = tk.root();
        let label = tk.create(root, WidgetKind::label("0"), Rect::sized(10, 10)).unwrap();
        let mut n = 0;
        tk.create_timer(Duration::from_millis(100), move |tree| {
            n += 1;
            let _ = tree.set_text(label, n.to_string());
        });

        assert_eq!(tk.timer_handler(), Some(Duration::from_millis(100)));
        tk.tick_inc(Duration::from_millis(60));
        tk.timer_handler();
        tk.tick_inc(Duration::from_millis(60));
        assert_eq!(tk.timer_handler(), Some(Duration::from_millis(100)));
        assert_eq!(tk.tree().get(label).unwrap().text(), Some("1"));
    }

    #[test]
    fn focus_wraps_over_buttons() {
        let mut tk = toolkit();
        let root = tk.root();
        let a = tk.create(root, WidgetKind::button(|| {}), Rect::new(0, 0, 10, 10)).unwrap();
        let b = tk.create(root, WidgetKind::button(|| {}), Rect::new(20, 0, 10, 10)).unwrap();

        tk.move_focus(1);
        assert_eq!(tk.focused(), Some(a));
        tk.move_focus(1);
        assert_eq!(tk.focused(), Some(b));
        tk.move_focus(1);
        assert_eq!(tk.focused(), Some(a));
        tk.move_focus(-1);
        assert_eq!(tk.focused(), Some(b));
    }

    #[test]
    fn clean_root_drops_focus() {
        let mut tk = toolkit();
        let root = tk.root();
        tk.create(root, WidgetKind::button(|| {}), Rect::sized(5, 5)).unwrap();
        tk.move_focus(1);
        tk.clean_root();
        assert_eq!(tk.focused(), None);
        assert!(tk.tree().is_empty());
    }

    #[test]
    fn default_style_applies_to_live_widgets_only() {
        let mut tk = toolkit();
        let root = tk.root();
        let label = tk.create(root, WidgetKind::label("x"), Rect::sized(5, 5)).unwrap();
        tk.apply_default_text_style(label).unwrap();
        assert_eq!(tk.tree().get(label).unwrap().style.text, Some(TextStyle::default()));

        tk.clean_root();
        assert!(tk.apply_default_text_style(label).is_err());
    }
}
