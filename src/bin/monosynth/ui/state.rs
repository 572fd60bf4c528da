//! Snapshot types the UI renders from

use monosynth::{
    dsp::EnvelopeStage,
    io::{OutputDevice, SinkConfig},
    synth::{KeyMap, KeyStates, NoteController, SynthConfig},
};

/// Static state gathered once at startup
pub struct UiStatic {
    /// Every output device found at startup
    pub devices: Vec<OutputDevice>,
    /// The device being played through
    pub device: OutputDevice,
    pub sink: SinkConfig,
    pub synth: SynthConfig,
    pub keys: KeyMap,
}

/// Per-frame view of the note, taken on the input thread
#[derive(Clone, Copy, Debug)]
pub struct UiState {
    pub time: f64,
    pub held: KeyStates,
    pub active_key: Option<usize>,
    /// Hz, 0.0 before the first note
    pub frequency: f64,
    /// Envelope level (0.0-1.0)
    pub level: f64,
    pub stage: EnvelopeStage,
}

impl UiState {
    pub fn capture(controller: &NoteController, time: f64) -> Self {
        let envelope = controller.envelope();
        Self {
            time,
            held: controller.keys(),
            active_key: controller.active_key(),
            frequency: controller.frequency(),
            level: envelope.amplitude_at(time),
            stage: envelope.stage_at(time),
        }
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            time: 0.0,
            held: KeyStates::NONE,
            active_key: None,
            frequency: 0.0,
            level: 0.0,
            stage: EnvelopeStage::Idle,
        }
    }
}
