//! Waveform oscilloscope widget

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use monosynth::dsp::WaveformKind;

/// Render the most recent output samples.
///
/// The vertical range follows the master volume so a full-scale note fills
/// the panel.
pub fn render_waveform(
    frame: &mut Frame,
    area: Rect,
    audio_buffer: &[f32],
    waveform: WaveformKind,
    master_volume: f64,
) {
    let block = Block::default()
        .title(format!(" Output ({waveform}) "))
        .borders(Borders::ALL);

    let len = audio_buffer.len().max(1) as f64;
    let data: Vec<(f64, f64)> = audio_buffer
        .iter()
        .enumerate()
        .map(|(i, &sample)| (i as f64 / len, f64::from(sample)))
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    let range = master_volume.max(0.05) * 1.1;
    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-range, range])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
