use std::sync::atomic::Ordering;
use std::sync::Arc;

use log::{debug, warn};

use crate::atomic::AtomicF64;
use crate::dsp::envelope::Envelope;
use crate::dsp::oscillator::{amplitude, RandomSource, WaveformKind};
use crate::error::Result;
use crate::synth::config::SynthConfig;
use crate::synth::keyboard::{KeySource, KeyStates};
use crate::synth::SampleSource;

/// State shared between the input thread and the audio thread.
#[derive(Debug)]
struct SharedNote {
    /// Hz; 0.0 until the first key is pressed.
    frequency: AtomicF64,
    envelope: Envelope,
}

/// What a key event did to the sounding note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteChange {
    On { key: usize, frequency: f64, time: f64 },
    Off { time: f64 },
}

/// Input-side half of the monophonic voice.
///
/// Owned by the keyboard polling loop. Turns key presses into pitch changes
/// and envelope gates, which the paired [`SampleProducer`] picks up on its
/// next sample.
pub struct NoteController {
    shared: Arc<SharedNote>,
    config: SynthConfig,

    /// Held keys, oldest first.
    held: Vec<usize>,
    active_key: Option<usize>,
    /// Last snapshot seen by `update_keys`.
    keys: KeyStates,
}

/// Audio-side half of the monophonic voice.
///
/// Lives inside the audio callback. Only reads shared state, never blocks
/// and never allocates.
pub struct SampleProducer<R = fastrand::Rng> {
    shared: Arc<SharedNote>,
    waveform: WaveformKind,
    master_volume: f64,
    rng: R,
}

impl NoteController {
    /// Create a controller and its producer, with noise drawn from a randomly
    /// seeded generator.
    pub fn new(config: SynthConfig) -> Result<(Self, SampleProducer)> {
        Self::with_rng(config, fastrand::Rng::new())
    }

    /// Same as [`NoteController::new`] with an explicit noise source.
    pub fn with_rng<R: RandomSource>(
        config: SynthConfig,
        rng: R,
    ) -> Result<(Self, SampleProducer<R>)> {
        config.validate()?;

        let shared = Arc::new(SharedNote {
            frequency: AtomicF64::new(0.0),
            envelope: Envelope::new(config.envelope)?,
        });

        let producer = SampleProducer {
            shared: Arc::clone(&shared),
            waveform: config.waveform,
            master_volume: config.master_volume,
            rng,
        };

        let controller = Self {
            shared,
            config,
            held: Vec::with_capacity(KeyStates::CAPACITY),
            active_key: None,
            keys: KeyStates::NONE,
        };

        Ok((controller, producer))
    }

    /// A key went down (`pressed`) or up at `time`.
    ///
    /// Pressing a key other than the sounding one retunes and retriggers.
    /// Pressing the sounding key again does nothing. Releasing the sounding
    /// key hands the note back to the most recently pressed key still held,
    /// or releases the envelope when none is left.
    pub fn note_event(&mut self, key: usize, pressed: bool, time: f64) -> Option<NoteChange> {
        if pressed {
            if self.active_key == Some(key) {
                return None;
            }
            self.held.retain(|&k| k != key);
            self.held.push(key);
            return Some(self.start(key, time));
        }

        let was_held = self.held.contains(&key);
        self.held.retain(|&k| k != key);
        if !was_held || self.active_key != Some(key) {
            return None;
        }

        match self.held.last().copied() {
            Some(next) => Some(self.start(next, time)),
            None => {
                self.active_key = None;
                self.shared.envelope.release(time);
                debug!("note off at {time:.3}s");
                Some(NoteChange::Off { time })
            }
        }
    }

    /// Feed a fresh snapshot of held keys, emitting an event for each change
    /// since the previous snapshot. Returns the last resulting change.
    pub fn update_keys(&mut self, keys: KeyStates, time: f64) -> Option<NoteChange> {
        let previous = std::mem::replace(&mut self.keys, keys);
        previous
            .transitions(keys)
            .filter_map(|t| self.note_event(t.key, t.pressed, time))
            .last()
    }

    /// Poll `source` once and apply the result. A failed read counts as
    /// "no keys held" for this cycle.
    pub fn poll<K: KeySource + ?Sized>(&mut self, source: &mut K, time: f64) -> Option<NoteChange> {
        let keys = source.poll().unwrap_or_else(|err| {
            warn!("{err}; treating as no keys held");
            KeyStates::NONE
        });
        self.update_keys(keys, time)
    }

    fn start(&mut self, key: usize, time: f64) -> NoteChange {
        let frequency = self.config.key_frequency(key);
        self.shared.frequency.store(frequency, Ordering::Release);
        self.shared.envelope.trigger(time);
        self.active_key = Some(key);

        debug!("note on key {key} at {time:.3}s, {frequency:.2}Hz");
        NoteChange::On {
            key,
            frequency,
            time,
        }
    }

    pub fn active_key(&self) -> Option<usize> {
        self.active_key
    }

    pub fn keys(&self) -> KeyStates {
        self.keys
    }

    pub fn frequency(&self) -> f64 {
        self.shared.frequency.load(Ordering::Acquire)
    }

    pub fn envelope(&self) -> &Envelope {
        &self.shared.envelope
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }
}

impl<R: RandomSource> SampleProducer<R> {
    /// Output sample at `time`: envelope × waveform × master volume.
    ///
    /// Always finite. Silent while no note has ever been played.
    pub fn sample(&mut self, time: f64) -> f32 {
        let frequency = self.shared.frequency.load(Ordering::Acquire);
        if frequency.is_nan() || frequency <= 0.0 {
            return 0.0;
        }

        let level = self.shared.envelope.amplitude_at(time);
        if level == 0.0 {
            return 0.0;
        }

        let value = level * amplitude(frequency, time, self.waveform, &mut self.rng) * self.master_volume;
        if value.is_finite() {
            value as f32
        } else {
            0.0
        }
    }

    /// Envelope level at `time`, for metering.
    pub fn level(&self, time: f64) -> f64 {
        self.shared.envelope.amplitude_at(time)
    }

    pub fn waveform(&self) -> WaveformKind {
        self.waveform
    }
}

impl<R: RandomSource + Send> SampleSource for SampleProducer<R> {
    #[inline]
    fn sample(&mut self, time: f64) -> f32 {
        SampleProducer::sample(self, time)
    }
}
