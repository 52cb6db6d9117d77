use anyhow::Result;

use super::{button, goto};
use crate::toolkit::geometry::{centered_rect, grid_cell};
use crate::toolkit::{Rgb, WidgetId};
use crate::ui::{Screen, ScreenCtx, ScreenId};

/// Choice between the rider and the bike profile.
#[derive(Default)]
pub struct ProfileScreen;

impl Screen for ProfileScreen {
    fn title(&self) -> &str {
        "Profiles"
    }

    fn enter(&mut self, ctx: &mut ScreenCtx<'_>, container: WidgetId) -> Result<()> {
        let area = ctx.rect_of(container)?;
        let choices = [
            ("Rider", Rgb::hex(0xcf6c1b), ScreenId::Rider),
            ("Bike", Rgb::hex(0x53bf45), ScreenId::Bike),
        ];
        for (col, (caption, color, target)) in choices.into_iter().enumerate() {
            let cell = grid_cell(area.width, area.height, 2, 1, col as i32, 0);
            let face = centered_rect(80, 50, cell);
            let on_click = goto(ctx.navigator(), target);
            button(ctx, container, face, caption, Some(color), on_click)?;
        }
        Ok(())
    }
}
