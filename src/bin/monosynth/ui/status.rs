//! Status widgets - device list, note on/off line, and audio stats

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use monosynth::synth::NoteChange;

use super::{UiState, UiStatic};

/// Audio statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    /// Compute audio stats from a buffer
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

/// Render the output devices found at startup, marking the one in use
pub fn render_devices(frame: &mut Frame, area: Rect, static_state: &UiStatic) {
    let block = Block::default()
        .title(" monosynth ")
        .borders(Borders::ALL);

    let lines: Vec<Line> = static_state
        .devices
        .iter()
        .map(|device| {
            let in_use = device.index() == static_state.device.index();
            Line::from(vec![
                Span::styled(
                    if in_use { " ▶ " } else { "   " },
                    Style::default().fg(Color::Green),
                ),
                Span::raw("Found Output Device: "),
                Span::styled(
                    device.to_string(),
                    Style::default().fg(if in_use { Color::White } else { Color::DarkGray }),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Render the note status bar
pub fn render_status(
    frame: &mut Frame,
    area: Rect,
    static_state: &UiStatic,
    state: &UiState,
    last_change: Option<NoteChange>,
    audio_stats: &AudioStats,
) {
    let block = Block::default().title(" Note ").borders(Borders::ALL);

    let note = match last_change {
        Some(NoteChange::On { time, frequency, .. }) => Span::styled(
            format!("Note On : {time:.3}s {frequency:.2}Hz"),
            Style::default().fg(Color::Green),
        ),
        Some(NoteChange::Off { time }) => Span::styled(
            format!("Note Off : {time:.3}s"),
            Style::default().fg(Color::Yellow),
        ),
        None => Span::styled("Press a key", Style::default().fg(Color::DarkGray)),
    };

    let line = Line::from(vec![
        Span::raw(" "),
        note,
        Span::raw("    "),
        Span::styled(
            format!("{:.2}Hz  {:?} {:.2}  ", state.frequency, state.stage, state.level),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!(
                "{}  {:.1}kHz  {:.1}s  ",
                static_state.synth.waveform,
                static_state.sink.sample_rate as f32 / 1000.0,
                state.time
            ),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", audio_stats.peak, audio_stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
