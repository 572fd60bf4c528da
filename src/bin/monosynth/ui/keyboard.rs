//! Piano keyboard widget - the playable keys, with held keys lit

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use monosynth::synth::KeyMap;

use super::UiState;

const DIAGRAM: [&str; 6] = [
    "|   |   |   |   |   | |   |   |   |   | |   | |   |   |   |",
    "|   | S |   |   | F | | G |   |   | J | | K | | L |   |   |",
    "|   |___|   |   |___| |___|   |   |___| |___| |___|   |   |__",
    "|     |     |     |     |     |     |     |     |     |     |",
    "|  Z  |  X  |  C  |  V  |  B  |  N  |  M  |  ,  |  .  |  /  |",
    "|_____|_____|_____|_____|_____|_____|_____|_____|_____|_____|",
];

/// Render the keyboard diagram
pub fn render_keyboard(frame: &mut Frame, area: Rect, keys: &KeyMap, state: &UiState) {
    let block = Block::default().title(" Keyboard ").borders(Borders::ALL);

    let lines: Vec<Line> = DIAGRAM
        .iter()
        .map(|row| Line::from(row.chars().map(|c| key_span(c, keys, state)).collect::<Vec<_>>()))
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn key_span(c: char, keys: &KeyMap, state: &UiState) -> Span<'static> {
    let style = match keys.index_of(c) {
        Some(index) if state.active_key == Some(index) => Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        Some(index) if state.held.is_down(index) => Style::default().fg(Color::Black).bg(Color::Cyan),
        Some(_) => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        None => Style::default().fg(Color::DarkGray),
    };
    Span::styled(c.to_string(), style)
}
