//! Color and style tokens for the viewer.
//!
//! Uses explicit foreground + background pairs so the UI is readable
//! regardless of the user's terminal theme (light or dark).

use ratatui::style::{Color, Modifier, Style};

/// Dark base background used for all panels.
const BG: Color = Color::Black;

pub fn base() -> Style {
    Style::default().bg(BG)
}

pub fn border() -> Style {
    Style::default().fg(Color::DarkGray).bg(BG)
}

pub fn title() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .bg(BG)
        .add_modifier(Modifier::BOLD)
}

pub fn status() -> Style {
    Style::default()
        .fg(Color::Green)
        .bg(BG)
        .add_modifier(Modifier::BOLD)
}

pub fn warn() -> Style {
    Style::default().fg(Color::Yellow).bg(BG)
}

pub fn subdued() -> Style {
    Style::default().fg(Color::Rgb(180, 180, 180)).bg(BG)
}

pub fn text() -> Style {
    Style::default().fg(Color::White).bg(BG)
}

pub fn error() -> Style {
    Style::default()
        .fg(Color::Red)
        .bg(BG)
        .add_modifier(Modifier::BOLD)
}

/// Highlight for the selected list row.
pub fn selected() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

pub fn checked() -> Style {
    Style::default().fg(Color::Green).bg(BG)
}

/// Style for modal borders.
pub fn modal_border() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .bg(BG)
        .add_modifier(Modifier::BOLD)
}
