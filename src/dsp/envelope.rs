use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::atomic::AtomicF64;
use crate::error::{Error, Result};

/*
ADSR Envelope
=============

A linear attack/decay/sustain/release envelope evaluated from timestamps
rather than stepped per sample. The envelope only remembers *when* the gate
last went high and low; the level at any time is computed on demand. That
keeps the audio thread read-only: it can ask for any time without mutating
anything, and the input thread only ever writes two timestamps and a flag.

  Level
   peak ┐     ╱╲
        │    ╱  ╲___________
   sus  │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release
          ↑                    ↑
       note_on_time       note_off_time


Gate high (elapsed = t - note_on_time)
--------------------------------------

  elapsed <= attack                  (elapsed / attack) · peak
  attack < elapsed <= attack+decay   peak → sustain, linear
  elapsed > attack+decay             sustain


Gate low
--------

  ((t - note_off_time) / release) · (0 - sustain) + sustain

Release always starts from the sustain level, wherever the note was when the
key came up. A note released during attack therefore jumps to sustain and
ramps down from there.


Silence
-------

Anything at or below SILENCE_EPSILON is forced to exactly 0.0. The release
ramp goes negative once it is finished, and the floor turns that into true
digital silence until the next trigger.
*/

/// Levels at or below this are output as exact silence.
pub const SILENCE_EPSILON: f64 = 0.0001;

/// Which part of the ADSR shape a query time falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// Envelope timings (seconds) and levels (0.0 - 1.0).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeConfig {
    pub attack: f64,
    pub decay: f64,
    pub release: f64,
    pub peak: f64,
    pub sustain: f64,
}

impl EnvelopeConfig {
    pub fn new(attack: f64, decay: f64, release: f64, peak: f64, sustain: f64) -> Result<Self> {
        let config = Self {
            attack,
            decay,
            release,
            peak,
            sustain,
        };
        config.validate()?;
        Ok(config)
    }

    /// Durations must be positive (a zero duration would divide by zero) and
    /// levels must lie in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("attack", self.attack),
            ("decay", self.decay),
            ("release", self.release),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::config(format!(
                    "envelope {name} must be a positive duration, got {value}"
                )));
            }
        }

        for (name, value) in [("peak", self.peak), ("sustain", self.sustain)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::config(format!(
                    "envelope {name} must be within 0.0..=1.0, got {value}"
                )));
            }
        }

        Ok(())
    }
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.01,
            release: 0.02,
            peak: 1.0,
            sustain: 0.8,
        }
    }
}

/// Shared ADSR envelope.
///
/// `trigger` and `release` are called from the input thread while the audio
/// thread calls `amplitude_at`; every field is atomic so neither side ever
/// blocks.
#[derive(Debug)]
pub struct Envelope {
    config: EnvelopeConfig,

    note_on_time: AtomicF64,
    note_off_time: AtomicF64,
    note_active: AtomicBool,
}

impl Envelope {
    pub fn new(config: EnvelopeConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            note_on_time: AtomicF64::new(0.0),
            // Released infinitely long ago: silent until the first trigger.
            note_off_time: AtomicF64::new(f64::NEG_INFINITY),
            note_active: AtomicBool::new(false),
        })
    }

    /// Gate high at `time`. Retriggering restarts the attack from zero.
    pub fn trigger(&self, time: f64) {
        self.note_on_time.store(time, Ordering::Relaxed);
        self.note_active.store(true, Ordering::Release);
    }

    /// Gate low at `time`.
    pub fn release(&self, time: f64) {
        self.note_off_time.store(time, Ordering::Relaxed);
        self.note_active.store(false, Ordering::Release);
    }

    /// Envelope level at `time`, in `[0, 1]`. Never mutates.
    pub fn amplitude_at(&self, time: f64) -> f64 {
        let EnvelopeConfig {
            attack,
            decay,
            release,
            peak,
            sustain,
        } = self.config;

        let amplitude = if self.note_active.load(Ordering::Acquire) {
            let elapsed = time - self.note_on_time.load(Ordering::Relaxed);

            if elapsed <= attack {
                (elapsed / attack) * peak
            } else if elapsed <= attack + decay {
                ((elapsed - attack) / decay) * (sustain - peak) + peak
            } else {
                sustain
            }
        } else {
            let since_off = time - self.note_off_time.load(Ordering::Relaxed);
            (since_off / release) * (0.0 - sustain) + sustain
        };

        if amplitude.is_nan() || amplitude <= SILENCE_EPSILON {
            0.0
        } else {
            amplitude.min(1.0)
        }
    }

    /// Stage of the envelope at `time`.
    pub fn stage_at(&self, time: f64) -> EnvelopeStage {
        let EnvelopeConfig {
            attack, decay, ..
        } = self.config;

        if self.note_active.load(Ordering::Acquire) {
            let elapsed = time - self.note_on_time.load(Ordering::Relaxed);
            if elapsed <= attack {
                EnvelopeStage::Attack
            } else if elapsed <= attack + decay {
                EnvelopeStage::Decay
            } else {
                EnvelopeStage::Sustain
            }
        } else if self.amplitude_at(time) > 0.0 {
            EnvelopeStage::Release
        } else {
            EnvelopeStage::Idle
        }
    }

    pub fn is_note_active(&self) -> bool {
        self.note_active.load(Ordering::Acquire)
    }

    pub fn note_on_time(&self) -> f64 {
        self.note_on_time.load(Ordering::Relaxed)
    }

    pub fn note_off_time(&self) -> f64 {
        self.note_off_time.load(Ordering::Relaxed)
    }

    pub fn config(&self) -> &EnvelopeConfig {
        &self.config
    }
}
