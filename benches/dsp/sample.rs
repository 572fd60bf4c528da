//! Benchmarks for full sample production, as run by the audio callback.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use monosynth::dsp::WaveformKind;
use monosynth::synth::{NoteController, SynthConfig};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_sample(c: &mut Criterion) {
    let mut group = c.benchmark_group("synth/sample");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for waveform in [WaveformKind::AnalogSaw, WaveformKind::DigitalSaw] {
            let config = SynthConfig::default().waveform(waveform);
            let (mut controller, mut producer) = NoteController::new(config).unwrap();
            controller.note_event(9, true, 0.0);

            group.bench_with_input(BenchmarkId::new(waveform.name(), size), &size, |b, _| {
                b.iter(|| {
                    for (i, out) in buffer.iter_mut().enumerate() {
                        *out = producer.sample(black_box(1.0 + i as f64 / SAMPLE_RATE));
                    }
                })
            });
        }

        // Nothing played yet: the early-out path
        let (_controller, mut producer) = NoteController::new(SynthConfig::default()).unwrap();
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| {
                for (i, out) in buffer.iter_mut().enumerate() {
                    *out = producer.sample(black_box(i as f64 / SAMPLE_RATE));
                }
            })
        });
    }

    group.finish();
}
