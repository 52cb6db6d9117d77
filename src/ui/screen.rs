use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::navigator::Navigator;
use super::Geometry;
use crate::error::UiError;
use crate::toolkit::{Rect, ToolkitError, Toolkit, WidgetId, WidgetKind};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ScreenId {
    Main,
    Data,
    Navigation,
    Results,
    Routes,
    Profile,
    Bike,
    Rider,
    Settings,
}

impl ScreenId {
    pub const ALL: [ScreenId; 9] = [
        ScreenId::Main,
        ScreenId::Data,
        ScreenId::Navigation,
        ScreenId::Results,
        ScreenId::Routes,
        ScreenId::Profile,
        ScreenId::Bike,
        ScreenId::Rider,
        ScreenId::Settings,
    ];
    pub const COUNT: usize = Self::ALL.len();

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ScreenId::Main => "main",
            ScreenId::Data => "data",
            ScreenId::Navigation => "navigation",
            ScreenId::Results => "results",
            ScreenId::Routes => "routes",
            ScreenId::Profile => "profile",
            ScreenId::Bike => "bike",
            ScreenId::Rider => "rider",
            ScreenId::Settings => "settings",
        }
    }
}

impl TryFrom<usize> for ScreenId {
    type Error = UiError;

    fn try_from(raw: usize) -> Result<Self, Self::Error> {
        Self::ALL.get(raw).copied().ok_or(UiError::InvalidScreen(raw))
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.index())
    }
}

/// Persistent furniture a screen wants around its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Chrome {
    /// Show the status bar above the content.
    pub visible: bool,
    /// Put a back button in the status bar leading to this screen.
    pub back: Option<ScreenId>,
}

impl Chrome {
    pub const HIDDEN: Chrome = Chrome { visible: false, back: None };
    pub const BAR: Chrome = Chrome { visible: true, back: None };

    pub const fn back_to(target: ScreenId) -> Chrome {
        Chrome { visible: true, back: Some(target) }
    }
}

/// What a screen gets to work with while its lifecycle handler runs.
///
/// Handlers run with the UI-state lock held, so everything here is already
/// exclusive: use the toolkit directly, never the locking `Ui` methods.
pub struct ScreenCtx<'a> {
    toolkit: &'a mut Toolkit,
    nav: &'a Navigator,
    geometry: Geometry,
}

impl<'a> ScreenCtx<'a> {
    pub(crate) fn new(toolkit: &'a mut Toolkit, nav: &'a Navigator, geometry: Geometry) -> Self {
        Self { toolkit, nav, geometry }
    }

    pub fn toolkit(&mut self) -> &mut Toolkit {
        self.toolkit
    }

    pub fn navigator(&self) -> &Navigator {
        self.nav
    }

    pub fn display_width(&self) -> i32 {
        self.geometry.width
    }

    pub fn display_height(&self) -> i32 {
        self.geometry.height
    }

    pub fn create(
        &mut self,
        parent: WidgetId,
        kind: WidgetKind,
        rect: Rect,
    ) -> Result<WidgetId, ToolkitError> {
        self.toolkit.create(parent, kind, rect)
    }

    /// Size and position of `id` relative to its parent.
    pub fn rect_of(&self, id: WidgetId) -> Result<Rect, ToolkitError> {
        self.toolkit.tree().get(id).map(|node| node.rect)
    }

    pub fn apply_default_text_style(&mut self, id: WidgetId) -> Result<(), UiError> {
        Ok(self.toolkit.apply_default_text_style(id)?)
    }
}

/// A full-display UI mode.
///
/// `enter` builds the screen's widgets under `container`; `exit` drops
/// whatever the screen keeps outside the widget tree (timers, cached ids).
/// By the time `exit` runs the screen's widgets are already gone.
pub trait Screen: Send {
    fn title(&self) -> &str {
        "Screen"
    }

    fn enter(&mut self, ctx: &mut ScreenCtx<'_>, container: WidgetId) -> Result<()>;

    fn exit(&mut self, _ctx: &mut ScreenCtx<'_>) -> Result<()> {
        Ok(())
    }
}

struct Entry {
    screen: Box<dyn Screen>,
    chrome: Chrome,
}

/// Screen slots indexed by [`ScreenId`]. Filled before the manager starts.
pub struct ScreenRegistry {
    slots: [Option<Entry>; ScreenId::COUNT],
}

impl Default for ScreenRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenRegistry {
    pub fn new() -> Self {
        Self { slots: std::array::from_fn(|_| None) }
    }

    pub fn register(mut self, id: ScreenId, chrome: Chrome, screen: impl Screen + 'static) -> Self {
        self.slots[id.index()] = Some(Entry { screen: Box::new(screen), chrome });
        self
    }

    pub fn contains(&self, id: ScreenId) -> bool {
        self.slots[id.index()].is_some()
    }

    pub fn chrome(&self, id: ScreenId) -> Option<Chrome> {
        self.slots[id.index()].as_ref().map(|e| e.chrome)
    }

    /// Display name of the screen in slot `id`.
    pub fn title(&self, id: ScreenId) -> Option<&str> {
        self.slots[id.index()].as_ref().map(|e| e.screen.title())
    }

    pub(crate) fn screen_mut(&mut self, id: ScreenId) -> Option<&mut (dyn Screen + 'static)> {
        self.slots[id.index()].as_mut().map(|e| e.screen.as_mut())
    }

    pub fn registered(&self) -> impl Iterator<Item = ScreenId> + '_ {
        ScreenId::ALL.into_iter().filter(|id| self.contains(*id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Blank;

    impl Screen for Blank {
        fn enter(&mut self, _ctx: &mut ScreenCtx<'_>, _container: WidgetId) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn ids_are_contiguous_from_zero() {
        for (i, id) in ScreenId::ALL.iter().enumerate() {
            assert_eq!(id.index(), i);
            assert_eq!(ScreenId::try_from(i).unwrap(), *id);
        }
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        assert!(matches!(
            ScreenId::try_from(ScreenId::COUNT),
            Err(UiError::InvalidScreen(n)) if n == ScreenId::COUNT
        ));
    }

    #[test]
    fn registry_reports_only_filled_slots() {
        let registry = ScreenRegistry::new()
            .register(ScreenId::Main, Chrome::BAR, Blank)
            .register(ScreenId::Data, Chrome::back_to(ScreenId::Main), Blank);

        assert!(registry.contains(ScreenId::Main));
        assert!(!registry.contains(ScreenId::Rider));
        assert_eq!(registry.chrome(ScreenId::Data), Some(Chrome::back_to(ScreenId::Main)));
        assert_eq!(registry.chrome(ScreenId::Rider), None);
        assert_eq!(registry.title(ScreenId::Main), Some("Screen"));
        assert_eq!(registry.title(ScreenId::Rider), None);
        assert_eq!(
            registry.registered().collect::<Vec<_>>(),
            vec![ScreenId::Main, ScreenId::Data]
        );
    }
}
