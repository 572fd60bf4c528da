//! TUI module for monosynth
//!
//! Shows the output devices, the playable keyboard, the note status and a
//! live view of the audio being produced.

mod keyboard;
mod spectrum;
mod state;
mod status;
mod waveform;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use rtrb::Consumer;

use monosynth::synth::{NoteChange, NoteController};

pub use state::{UiState, UiStatic};

use keyboard::render_keyboard;
use spectrum::{render_spectrum, SpectrumAnalyzer};
use status::{render_devices, render_status, AudioStats};
use waveform::render_waveform;

/// Audio visualization buffer size
pub const VIS_BUFFER_SIZE: usize = 1024;

/// UI application state
pub struct UiApp {
    /// Ring buffer receiver for audio samples
    audio_rx: Consumer<f32>,
    /// Audio sample buffer for visualization
    audio_buffer: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    static_state: UiStatic,
    current_state: UiState,
    /// Most recent note on/off, shown in the status bar
    last_change: Option<NoteChange>,
    reports_releases: bool,
}

impl UiApp {
    pub fn new(audio_rx: Consumer<f32>, static_state: UiStatic, reports_releases: bool) -> Self {
        let sample_rate = static_state.sink.sample_rate as f32;
        Self {
            audio_rx,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            spectrum: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, sample_rate),
            static_state,
            current_state: UiState::default(),
            last_change: None,
            reports_releases,
        }
    }

    pub fn note_changed(&mut self, change: NoteChange) {
        self.last_change = Some(change);
    }

    /// Pull new audio and refresh the note snapshot
    pub fn update(&mut self, controller: &NoteController, time: f64) {
        self.poll_audio();
        self.spectrum.update(&self.audio_buffer);
        self.current_state = UiState::capture(controller, time);
    }

    /// Poll for new audio samples from ring buffer
    fn poll_audio(&mut self) {
        let available = self.audio_rx.slots();
        if available == 0 {
            return;
        }

        // Keep only the last VIS_BUFFER_SIZE samples
        let Ok(chunk) = self.audio_rx.read_chunk(available) else {
            return;
        };
        let (first, second) = chunk.as_slices();
        self.audio_buffer.extend_from_slice(first);
        self.audio_buffer.extend_from_slice(second);
        chunk.commit_all();

        if self.audio_buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
            self.audio_buffer.drain(0..excess);
        }
    }

    /// Render the UI
    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let device_lines = self.static_state.devices.len().min(4) as u16;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(device_lines + 2), // Devices
                Constraint::Length(8),                // Keyboard
                Constraint::Length(3),                // Note status
                Constraint::Min(6),                   // Waveform
                Constraint::Min(6),                   // Spectrum
                Constraint::Length(1),                // Help bar
            ])
            .split(area);

        render_devices(frame, chunks[0], &self.static_state);
        render_keyboard(frame, chunks[1], &self.static_state.keys, &self.current_state);
        render_status(
            frame,
            chunks[2],
            &self.static_state,
            &self.current_state,
            self.last_change,
            &AudioStats::from_buffer(&self.audio_buffer),
        );
        render_waveform(
            frame,
            chunks[3],
            &self.audio_buffer,
            self.static_state.synth.waveform,
            self.static_state.synth.master_volume,
        );
        render_spectrum(frame, chunks[4], self.spectrum.data(), self.current_state.frequency);

        let hint = if self.reports_releases {
            " [Z..] Play  [Esc] Quit"
        } else {
            " [Z..] Play  [Esc] Quit  (no key-release reporting: notes hold briefly)"
        };
        let help = Paragraph::new(hint).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[5]);
    }
}
