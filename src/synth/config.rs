#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::envelope::EnvelopeConfig;
use crate::dsp::oscillator::WaveformKind;
use crate::error::{Error, Result};

/// 2^(1/12): frequency ratio between adjacent semitones in equal temperament.
pub const TWELFTH_ROOT_OF_TWO: f64 = 1.059_463_094_359_295_3;

/// A2, the pitch of key index 0 by default.
pub const DEFAULT_BASE_FREQUENCY: f64 = 110.0;

pub const DEFAULT_MASTER_VOLUME: f64 = 0.4;

/// Sound of the single voice. Fixed for the life of a controller.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthConfig {
    /// Frequency of key index 0, in Hz.
    pub base_frequency: f64,
    /// Final gain applied to every sample (0.0 - 1.0).
    pub master_volume: f64,
    pub waveform: WaveformKind,
    pub envelope: EnvelopeConfig,
}

impl SynthConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_frequency(mut self, hz: f64) -> Self {
        self.base_frequency = hz;
        self
    }

    pub fn master_volume(mut self, volume: f64) -> Self {
        self.master_volume = volume;
        self
    }

    pub fn waveform(mut self, waveform: WaveformKind) -> Self {
        self.waveform = waveform;
        self
    }

    pub fn envelope(mut self, envelope: EnvelopeConfig) -> Self {
        self.envelope = envelope;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.base_frequency.is_finite() && self.base_frequency > 0.0) {
            return Err(Error::config(format!(
                "base frequency must be positive, got {}",
                self.base_frequency
            )));
        }
        if !(0.0..=1.0).contains(&self.master_volume) {
            return Err(Error::config(format!(
                "master volume must be within 0.0..=1.0, got {}",
                self.master_volume
            )));
        }
        self.envelope.validate()
    }

    /// Equal-tempered pitch of `key` semitones above the base frequency.
    pub fn key_frequency(&self, key: usize) -> f64 {
        self.base_frequency * TWELFTH_ROOT_OF_TWO.powi(key as i32)
    }
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            base_frequency: DEFAULT_BASE_FREQUENCY,
            master_volume: DEFAULT_MASTER_VOLUME,
            waveform: WaveformKind::AnalogSaw,
            envelope: EnvelopeConfig::default(),
        }
    }
}
