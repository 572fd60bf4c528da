//! End-to-end: key snapshots in, samples out, the way the input loop and
//! the audio callback drive the synth.

#[cfg(feature = "rtrb")]
use monosynth::io::ScopeTap;
use monosynth::{
    dsp::{EnvelopeConfig, WaveformKind},
    synth::{KeySource, KeyStates, NoteChange, NoteController, SampleSource, SynthConfig},
    PollError,
};

const SAMPLE_RATE: f64 = 44_100.0;

/// Replays one key snapshot per poll, then reports nothing held.
struct Script {
    polls: std::vec::IntoIter<KeyStates>,
}

impl Script {
    fn new(polls: &[&[usize]]) -> Self {
        let polls: Vec<KeyStates> = polls
            .iter()
            .map(|keys| keys.iter().copied().collect())
            .collect();
        Self {
            polls: polls.into_iter(),
        }
    }
}

impl KeySource for Script {
    fn poll(&mut self) -> Result<KeyStates, PollError> {
        Ok(self.polls.next().unwrap_or(KeyStates::NONE))
    }
}

fn render(source: &mut impl SampleSource, from: f64, to: f64) -> Vec<f32> {
    let start = (from * SAMPLE_RATE) as u64;
    let end = (to * SAMPLE_RATE) as u64;
    (start..end)
        .map(|frame| source.sample(frame as f64 / SAMPLE_RATE))
        .collect()
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}

#[test]
fn startup_is_silent_for_every_waveform() {
    for waveform in WaveformKind::ALL {
        let (_controller, mut producer) =
            NoteController::new(SynthConfig::default().waveform(waveform)).unwrap();
        assert_eq!(peak(&render(&mut producer, 0.0, 0.25)), 0.0, "{waveform}");
    }
}

#[test]
fn played_note_sounds_then_fades_out() {
    let (mut controller, mut producer) = NoteController::new(SynthConfig::default()).unwrap();
    let mut keys = Script::new(&[&[0], &[0], &[]]);

    assert!(matches!(
        controller.poll(&mut keys, 0.1),
        Some(NoteChange::On { key: 0, frequency, .. }) if frequency == 110.0
    ));
    assert_eq!(controller.poll(&mut keys, 0.2), None);

    let held = render(&mut producer, 0.15, 0.3);
    assert!(peak(&held) > 0.1);
    assert!(peak(&held) <= 0.4 + 1e-6);

    assert_eq!(controller.poll(&mut keys, 0.3), Some(NoteChange::Off { time: 0.3 }));

    // Default release is 20ms.
    let tail = render(&mut producer, 0.3, 0.32);
    assert!(peak(&tail) > 0.0);
    let after = render(&mut producer, 0.33, 0.5);
    assert_eq!(peak(&after), 0.0);
}

#[test]
fn sliding_between_keys_retriggers_each_time() {
    let config = SynthConfig::default().waveform(WaveformKind::Sine);
    let (mut controller, _producer) = NoteController::new(config).unwrap();
    let mut keys = Script::new(&[&[0], &[0, 4], &[4], &[7], &[]]);

    controller.poll(&mut keys, 0.0);
    controller.poll(&mut keys, 0.1);
    assert_eq!(controller.active_key(), Some(4));
    assert_eq!(controller.envelope().note_on_time(), 0.1);

    // Releasing the quiet key changes nothing.
    assert_eq!(controller.poll(&mut keys, 0.2), None);
    assert_eq!(controller.envelope().note_on_time(), 0.1);

    controller.poll(&mut keys, 0.3);
    assert_eq!(controller.active_key(), Some(7));
    assert_eq!(controller.envelope().note_on_time(), 0.3);
    let expected = 110.0 * 2f64.powf(7.0 / 12.0);
    assert!((controller.frequency() - expected).abs() < 1e-9);

    assert!(matches!(controller.poll(&mut keys, 0.4), Some(NoteChange::Off { .. })));
}

#[test]
fn attack_ramps_from_silence() {
    let config = SynthConfig::default()
        .waveform(WaveformKind::Square)
        .master_volume(1.0)
        .envelope(EnvelopeConfig::new(0.01, 0.01, 0.02, 1.0, 0.8).unwrap());
    let (mut controller, mut producer) = NoteController::new(config).unwrap();

    controller.note_event(0, true, 0.0);
    // Square is ±1 so the magnitude is the envelope level itself.
    assert_eq!(producer.sample(0.0), 0.0);
    assert!((producer.sample(0.005).abs() - 0.5).abs() < 1e-6);
    assert!((producer.sample(0.5).abs() - 0.8).abs() < 1e-6);
}

#[cfg(feature = "rtrb")]
#[test]
fn scope_tap_sees_what_the_device_gets() {
    let (mut controller, producer) = NoteController::new(SynthConfig::default()).unwrap();
    let (mut tap, mut rx) = ScopeTap::new(producer, 1024);

    controller.note_event(12, true, 0.0);
    let played = render(&mut tap, 0.0, 512.0 / SAMPLE_RATE);

    let mut seen = Vec::new();
    while let Ok(sample) = rx.pop() {
        seen.push(sample);
    }
    assert_eq!(seen, played);
}
