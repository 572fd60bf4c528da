//! Low-level DSP primitives used by the instrument.
//!
//! Both are evaluated from absolute time, so they can be queried from the
//! audio thread without advancing any per-sample state.

/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Oscillator waveforms and noise sources.
pub mod oscillator;

pub use envelope::{Envelope, EnvelopeConfig, EnvelopeStage};
pub use oscillator::{amplitude, RandomSource, WaveformKind};
