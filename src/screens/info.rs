use anyhow::Result;

use super::{button, go_back, label};
use crate::toolkit::geometry::header_body;
use crate::toolkit::{FontSize, Rect, TextStyle, WidgetId, WidgetKind};
use crate::ui::{Screen, ScreenCtx};

const ROW_HEIGHT: i32 = 48;
const BACK_TEXT: &str = "< Back";

/// Placeholder content: a title and a few text rows. Screens shown without
/// chrome get their own back button.
pub struct InfoScreen {
    title: &'static str,
    rows: Vec<String>,
    own_back: bool,
}

impl InfoScreen {
    pub fn new(title: &'static str, rows: Vec<String>, own_back: bool) -> Self {
        Self { title, rows, own_back }
    }

    pub fn navigation() -> Self {
        Self::new("Navigation", vec!["No route loaded".into()], true)
    }

    pub fn results() -> Self {
        Self::new("Results", vec!["No rides recorded yet".into()], false)
    }

    pub fn routes() -> Self {
        Self::new("Routes", vec!["No routes available".into()], false)
    }

    pub fn bike() -> Self {
        let fields = ["Name", "Brand", "Model", "Weight", "Type", "Wheel size"];
        Self::new("Bike", fields.iter().map(|f| format!("{f}: -")).collect(), true)
    }

    pub fn rider() -> Self {
        let fields = ["Name", "Age", "Weight", "Height", "FTP", "Max heart rate"];
        Self::new("Rider", fields.iter().map(|f| format!("{f}: -")).collect(), true)
    }
}

impl Screen for InfoScreen {
    fn title(&self) -> &str {
        self.title
    }

    fn enter(&mut self, ctx: &mut ScreenCtx<'_>, container: WidgetId) -> Result<()> {
        let area = ctx.rect_of(container)?;
        let (header, body) = header_body(area.width, area.height, ROW_HEIGHT * 2);

        if self.own_back {
            let back = Rect::new(0, 0, header.width * 35 / 100, header.height);
            let on_click = go_back(ctx.navigator());
            button(ctx, container, back, BACK_TEXT, None, on_click)?;
        }
        let title = ctx.create(container, WidgetKind::label(self.title), header)?;
        let style = TextStyle { size: FontSize::Large, ..ctx.toolkit().default_text_style() };
        ctx.toolkit().tree_mut().set_text_style(title, style)?;

        for (i, row) in self.rows.iter().enumerate() {
            let y = body.y + i as i32 * ROW_HEIGHT;
            if y + ROW_HEIGHT > body.bottom() {
                break;
            }
            label(ctx, container, Rect::new(0, y, body.width, ROW_HEIGHT), row)?;
        }
        Ok(())
    }
}
