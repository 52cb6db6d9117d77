//! Terminal panel: ratatui output, crossterm input.
//!
//! The widget tree is laid out in logical display pixels; it is projected
//! onto whatever cell grid the terminal has, minus one row for the key legend.
//! Mouse clicks are projected back and delivered as touches.

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect as CellRect},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};

use super::style;
use super::{Display, DisplayError, InputEvent, NavKey};
use crate::toolkit::{Node, Rect, WidgetId, WidgetKind, WidgetTree};

pub struct TerminalDisplay {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    logical: (i32, i32),
    canvas: CellRect,
}

impl TerminalDisplay {
    /// Take over the terminal: raw mode, alternate screen, mouse capture.
    pub fn new(width: i32, height: i32) -> Result<Self, DisplayError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
            restore_terminal();
            return Err(e.into());
        }
        let mut terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(t) => t,
            Err(e) => {
                restore_terminal();
                return Err(e.into());
            }
        };
        terminal.clear()?; // clean start

        Ok(Self {
            terminal,
            logical: (width, height),
            canvas: CellRect::default(),
        })
    }

    fn to_logical(&self, column: u16, row: u16) -> Option<(i32, i32)> {
        let c = self.canvas;
        if c.width == 0 || c.height == 0 {
            return None;
        }
        if column < c.x || row < c.y || column >= c.x + c.width || row >= c.y + c.height {
            return None;
        }
        let (lw, lh) = (i64::from(self.logical.0), i64::from(self.logical.1));
        // aim at the middle of the cell
        let x = (i64::from(column - c.x) * 2 + 1) * lw / (2 * i64::from(c.width));
        let y = (i64::from(row - c.y) * 2 + 1) * lh / (2 * i64::from(c.height));
        Some((x as i32, y as i32))
    }
}

/// Best-effort terminal restore; safe to call more than once.
pub fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        restore_terminal();
        let _ = self.terminal.show_cursor();
    }
}

/// Project a logical rect onto the cell grid of `canvas`.
fn project(r: Rect, logical: (i32, i32), canvas: CellRect) -> Option<CellRect> {
    let (lw, lh) = (i64::from(logical.0), i64::from(logical.1));
    if lw <= 0 || lh <= 0 || r.width <= 0 || r.height <= 0 {
        return None;
    }
    let scale = |v: i32, logical: i64, cells: u16| -> i64 {
        i64::from(v).clamp(0, logical) * i64::from(cells) / logical
    };
    let x0 = scale(r.x, lw, canvas.width);
    let y0 = scale(r.y, lh, canvas.height);
    let x1 = scale(r.right(), lw, canvas.width).max(x0 + 1).min(i64::from(canvas.width));
    let y1 = scale(r.bottom(), lh, canvas.height).max(y0 + 1).min(i64::from(canvas.height));
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(CellRect::new(
        canvas.x + x0 as u16,
        canvas.y + y0 as u16,
        (x1 - x0) as u16,
        (y1 - y0) as u16,
    ))
}

fn draw_node(f: &mut Frame<'_>, node: &Node, area: CellRect, focused: bool) {
    match &node.kind {
        WidgetKind::Container => {
            if node.style.background.is_none() && !node.style.border {
                return;
            }
            let mut block = Block::default().style(style::background(node.style.background));
            if node.style.border {
                block = block.borders(Borders::ALL);
            }
            f.render_widget(block, area);
        }
        WidgetKind::Button { .. } => {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(style::button_border(focused))
                .style(style::background(node.style.background));
            f.render_widget(block, area);
        }
        WidgetKind::Label { text } => {
            let lines = text.lines().count().max(1) as u16;
            let pad = area.height.saturating_sub(lines) / 2;
            let inner = CellRect::new(area.x, area.y + pad, area.width, area.height - pad);
            let paragraph = Paragraph::new(text.as_str())
                .style(style::text_style(node.style.text))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            f.render_widget(paragraph, inner);
        }
    }
}

fn key_event(k: KeyEvent) -> Option<InputEvent> {
    let ctrl = k.modifiers.contains(KeyModifiers::CONTROL);
    let event = match k.code {
        KeyCode::Char('q' | 'Q') => InputEvent::Close,
        KeyCode::Char('c') if ctrl => InputEvent::Close,
        KeyCode::Tab | KeyCode::Right | KeyCode::Down => InputEvent::Key(NavKey::Next),
        KeyCode::BackTab | KeyCode::Left | KeyCode::Up => InputEvent::Key(NavKey::Prev),
        KeyCode::Enter | KeyCode::Char(' ') => InputEvent::Key(NavKey::Activate),
        KeyCode::Esc | KeyCode::Backspace => InputEvent::Key(NavKey::Back),
        _ => return None,
    };
    Some(event)
}

impl Display for TerminalDisplay {
    fn draw(&mut self, tree: &WidgetTree, focused: Option<WidgetId>) -> Result<(), DisplayError> {
        let logical = self.logical;
        let mut canvas = self.canvas;
        self.terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(1)])
                .split(f.size());
            canvas = chunks[0];

            for (id, rect) in tree.walk() {
                let Ok(node) = tree.get(id) else { continue };
                if let Some(area) = project(rect, logical, canvas) {
                    draw_node(f, node, area, focused == Some(id));
                }
            }
            f.render_widget(Paragraph::new(style::help_line()), chunks[1]);
        })?;
        self.canvas = canvas;
        Ok(())
    }

    fn wait_event(&mut self, timeout: Duration) -> Result<Option<InputEvent>, DisplayError> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        let event = match event::read()? {
            Event::Mouse(m) if matches!(m.kind, MouseEventKind::Down(MouseButton::Left)) => self
                .to_logical(m.column, m.row)
                .map(|(x, y)| InputEvent::Touch { x, y }),
            Event::Key(k) if k.kind == KeyEventKind::Press => key_event(k),
            Event::Resize(_, _) => Some(InputEvent::Resize),
            _ => None,
        };
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_scales_to_cells() {
        let canvas = CellRect::new(0, 0, 100, 40);
        let r = Rect::new(512, 400, 512, 400);
        assert_eq!(project(r, (1024, 800), canvas), Some(CellRect::new(50, 20, 50, 20)));
    }

    #[test]
    fn tiny_rects_still_get_one_cell() {
        let canvas = CellRect::new(0, 0, 10, 10);
        let r = Rect::new(0, 0, 5, 5);
        assert_eq!(project(r, (1000, 1000), canvas), Some(CellRect::new(0, 0, 1, 1)));
    }

    #[test]
    fn empty_rects_are_skipped() {
        let canvas = CellRect::new(0, 0, 10, 10);
        assert_eq!(project(Rect::new(0, 0, 0, 5), (10, 10), canvas), None);
    }

    #[test]
    fn keys_map_to_navigation() {
        let press = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(key_event(press(KeyCode::Tab)), Some(InputEvent::Key(NavKey::Next)));
        assert_eq!(key_event(press(KeyCode::Esc)), Some(InputEvent::Key(NavKey::Back)));
        assert_eq!(key_event(press(KeyCode::Char('q'))), Some(InputEvent::Close));
        assert_eq!(
            key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(InputEvent::Close)
        );
        assert_eq!(key_event(press(KeyCode::Char('x'))), None);
    }
}
