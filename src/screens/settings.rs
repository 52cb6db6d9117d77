use anyhow::Result;

use super::label;
use crate::toolkit::geometry::header_body;
use crate::toolkit::{Rect, WidgetId};
use crate::ui::{Screen, ScreenCtx};

const SECTIONS: [&str; 5] = ["WiFi", "Bluetooth", "ANT", "Sensors", "Map"];

/// Settings overview with the device's about line at the bottom.
pub struct SettingsScreen {
    about: String,
}

impl SettingsScreen {
    pub fn new(device_name: &str) -> Self {
        Self {
            about: format!("{device_name} - touchshell {}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn about(&self) -> &str {
        &self.about
    }
}

impl Screen for SettingsScreen {
    fn title(&self) -> &str {
        "Settings"
    }

    fn enter(&mut self, ctx: &mut ScreenCtx<'_>, container: WidgetId) -> Result<()> {
        let area = ctx.rect_of(container)?;
        let row_h = area.height / (SECTIONS.len() as i32 + 1);
        let (list, footer) = header_body(area.width, area.height, area.height - row_h);

        for (i, section) in SECTIONS.iter().enumerate() {
            let y = list.y + i as i32 * row_h;
            label(ctx, container, Rect::new(0, y, list.width, row_h), section)?;
        }
        label(ctx, container, footer, &self.about)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn about_names_the_device() {
        let screen = SettingsScreen::new("trailbox");
        assert!(screen.about().starts_with("trailbox - touchshell "));
    }
}
