pub mod dsp; // Waveforms and envelopes
pub mod error;
pub mod io; // Audio devices, output stream, terminal keyboard
pub mod synth; // Monophonic note control

mod atomic;

pub use error::{Error, PollError, Result};
