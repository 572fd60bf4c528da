// Purpose: the playable instrument. Key events in, samples out.

pub mod config;
pub mod controller;
pub mod keyboard;

pub use config::SynthConfig;
pub use controller::{NoteChange, NoteController, SampleProducer};
pub use keyboard::{KeyMap, KeySource, KeyStates, KeyTransition};

/// Anything that can produce one mono sample for a playback time in seconds.
///
/// Called once per output frame from the audio thread, so implementations
/// must not block or allocate.
pub trait SampleSource: Send {
    fn sample(&mut self, time: f64) -> f32;
}
