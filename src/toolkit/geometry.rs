// geometry.rs
/// Axis-aligned rectangle in logical display pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub const fn sized(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Shift by the origin of `parent`, turning a parent-relative rect absolute.
    pub fn offset_by(&self, parent: Rect) -> Rect {
        Rect::new(parent.x + self.x, parent.y + self.y, self.width, self.height)
    }

    pub fn inset(&self, margin: i32) -> Rect {
        let w = (self.width - 2 * margin).max(0);
        let h = (self.height - 2 * margin).max(0);
        Rect::new(self.x + margin, self.y + margin, w, h)
    }
}

/// Rect of `width` x `height` centered in `r`, clamped to fit.
pub fn centered_rect_abs(width: i32, height: i32, r: Rect) -> Rect {
    let w = width.min(r.width);
    let h = height.min(r.height);
    let x = r.x + (r.width - w) / 2;
    let y = r.y + (r.height - h) / 2;
    Rect::new(x, y, w, h)
}

/// Rect taking `percent_x`/`percent_y` of `r`, centered.
pub fn centered_rect(percent_x: i32, percent_y: i32, r: Rect) -> Rect {
    centered_rect_abs(r.width * percent_x / 100, r.height * percent_y / 100, r)
}

/// Cell (`col`, `row`) of a uniform `cols` x `rows` grid laid over a
/// `width` x `height` area, relative to that area.
pub fn grid_cell(width: i32, height: i32, cols: i32, rows: i32, col: i32, row: i32) -> Rect {
    let cols = cols.max(1);
    let rows = rows.max(1);
    let x0 = width * col / cols;
    let x1 = width * (col + 1) / cols;
    let y0 = height * row / rows;
    let y1 = height * (row + 1) / rows;
    Rect::new(x0, y0, x1 - x0, y1 - y0)
}

/// Split a `height` tall column into a fixed `header` band and the rest.
pub fn header_body(width: i32, height: i32, header: i32) -> (Rect, Rect) {
    let header = header.clamp(0, height);
    (
        Rect::new(0, 0, width, header),
        Rect::new(0, header, width, height - header),
    )
}
