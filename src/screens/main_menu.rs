use anyhow::Result;

use super::{button, goto, label};
use crate::toolkit::geometry::grid_cell;
use crate::toolkit::{Rect, Rgb, WidgetId, WidgetKind};
use crate::ui::{Screen, ScreenCtx, ScreenId};

/// Caption under each tile, as a share of the cell height.
const CAPTION_PERCENT: i32 = 15;
const MARGIN: i32 = 8;

struct Tile {
    caption: &'static str,
    color: Rgb,
    target: ScreenId,
}

// row-major, two per row
const TILES: [Tile; 6] = [
    Tile { caption: "Data", color: Rgb::hex(0xcf6c1b), target: ScreenId::Data },
    Tile { caption: "Navigation", color: Rgb::hex(0x53bf45), target: ScreenId::Navigation },
    Tile { caption: "Results", color: Rgb::hex(0xb16ccc), target: ScreenId::Results },
    Tile { caption: "Routes", color: Rgb::hex(0x368aad), target: ScreenId::Routes },
    Tile { caption: "Profiles", color: Rgb::hex(0xe69ae0), target: ScreenId::Profile },
    Tile { caption: "Settings", color: Rgb::hex(0x624791), target: ScreenId::Settings },
];

/// Home screen: a 2x3 grid of colored tiles, one per feature.
#[derive(Default)]
pub struct MainMenuScreen;

impl Screen for MainMenuScreen {
    fn title(&self) -> &str {
        "Main"
    }

    fn enter(&mut self, ctx: &mut ScreenCtx<'_>, container: WidgetId) -> Result<()> {
        let area = ctx.rect_of(container)?;
        for (i, tile) in TILES.iter().enumerate() {
            let (col, row) = (i as i32 % 2, i as i32 / 2);
            let cell = grid_cell(area.width, area.height, 2, 3, col, row);
            let cell_box = ctx.create(container, WidgetKind::Container, cell)?;

            let inner = Rect::sized(cell.width, cell.height).inset(MARGIN);
            let caption_h = inner.height * CAPTION_PERCENT / 100;
            let face = Rect::new(inner.x, inner.y, inner.width, inner.height - caption_h);
            let on_click = goto(ctx.navigator(), tile.target);
            button(ctx, cell_box, face, "", Some(tile.color), on_click)?;
            label(
                ctx,
                cell_box,
                Rect::new(inner.x, face.bottom(), inner.width, caption_h),
                tile.caption,
            )?;
        }
        Ok(())
    }
}
