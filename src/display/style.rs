// style.rs
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::toolkit::{FontSize, Rgb, TextStyle};

pub fn span_key(s: &'static str) -> Span<'static> {
    Span::styled(s, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
}
pub fn span_sep() -> Span<'static> {
    Span::styled("  |  ", Style::default().fg(Color::DarkGray))
}
pub fn span_text(s: &'static str) -> Span<'static> {
    Span::raw(s)
}

/// One-line key legend shown under the panel.
pub fn help_line() -> Line<'static> {
    Line::from(vec![
        span_key("Click"), span_text(" Touch"), span_sep(),
        span_key("Tab/←/→"), span_text(" Move"), span_sep(),
        span_key("Enter"), span_text(" Press"), span_sep(),
        span_key("Esc"), span_text(" Back"), span_sep(),
        span_key("q"), span_text(" Power off"),
    ])
}

/* ---------- widget painting ---------- */

const FOCUS_BORDER: Color = Color::Cyan;
const IDLE_BORDER: Color = Color::Gray;

pub fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

pub fn text_style(text: Option<TextStyle>) -> Style {
    let text = text.unwrap_or_default();
    let style = Style::default().fg(color(text.color));
    match text.size {
        FontSize::Small => style.add_modifier(Modifier::DIM),
        FontSize::Normal => style,
        FontSize::Large => style.add_modifier(Modifier::BOLD),
    }
}

pub fn button_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(FOCUS_BORDER).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(IDLE_BORDER)
    }
}

pub fn background(bg: Option<Rgb>) -> Style {
    match bg {
        Some(rgb) => Style::default().bg(color(rgb)),
        None => Style::default(),
    }
}
