use std::time::Duration;

use anyhow::{Context, Result};

use super::label;
use crate::toolkit::geometry::grid_cell;
use crate::toolkit::{FontSize, Rect, TextStyle, TimerId, WidgetId, WidgetKind, WidgetTree};
use crate::ui::{Screen, ScreenCtx};

const METRICS: [&str; 6] = ["Speed", "Distance", "Ride time", "Heart rate", "Cadence", "Power"];
const RIDE_TIME: usize = 2;
const NO_READING: &str = "--";

fn hms(seconds: u64) -> String {
    format!("{:02}:{:02}:{:02}", seconds / 3600, seconds / 60 % 60, seconds % 60)
}

/// Live ride data. Sensor plumbing is out of scope, so only the ride timer
/// moves; the other tiles show no reading.
#[derive(Default)]
pub struct DataScreen {
    ticker: Option<TimerId>,
}

impl Screen for DataScreen {
    fn title(&self) -> &str {
        "Data"
    }

    fn enter(&mut self, ctx: &mut ScreenCtx<'_>, container: WidgetId) -> Result<()> {
        let area = ctx.rect_of(container)?;
        let mut ride_time = None;
        for (i, name) in METRICS.iter().enumerate() {
            let cell = grid_cell(area.width, area.height, 2, 3, i as i32 % 2, i as i32 / 2);
            let tile = ctx.create(container, WidgetKind::Container, cell.inset(4))?;
            let inner = ctx.rect_of(tile)?;
            let (head, value_h) = (inner.height / 3, inner.height - inner.height / 3);

            label(ctx, tile, Rect::sized(inner.width, head), name)?;
            let initial = if i == RIDE_TIME { hms(0) } else { NO_READING.to_owned() };
            let value = ctx.create(
                tile,
                WidgetKind::label(initial),
                Rect::new(0, head, inner.width, value_h),
            )?;
            let large = TextStyle { size: FontSize::Large, ..ctx.toolkit().default_text_style() };
            ctx.toolkit().tree_mut().set_text_style(value, large)?;
            if i == RIDE_TIME {
                ride_time = Some(value);
            }
        }

        let value = ride_time.context("ride time tile missing")?;
        let mut elapsed = 0u64;
        self.ticker = Some(ctx.toolkit().create_timer(
            Duration::from_secs(1),
            move |tree: &mut WidgetTree| {
                elapsed += 1;
                // the widget goes away with the screen, the timer with `exit`
                let _ = tree.set_text(value, hms(elapsed));
            },
        ));
        Ok(())
    }

    fn exit(&mut self, ctx: &mut ScreenCtx<'_>) -> Result<()> {
        if let Some(timer) = self.ticker.take() {
            ctx.toolkit().delete_timer(timer);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ride_time_format() {
        assert_eq!(hms(0), "00:00:00");
        assert_eq!(hms(3_725), "01:02:05");
    }
}
