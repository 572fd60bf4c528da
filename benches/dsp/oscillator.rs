//! Benchmarks for waveform generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use monosynth::dsp::oscillator::{amplitude, WaveformKind};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let mut rng = fastrand::Rng::with_seed(0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f64; size];

        // AnalogSaw sums 99 sines per sample, the others are closed form
        for kind in WaveformKind::ALL {
            group.bench_with_input(BenchmarkId::new(kind.name(), size), &size, |b, _| {
                b.iter(|| {
                    for (i, out) in buffer.iter_mut().enumerate() {
                        let t = i as f64 / SAMPLE_RATE;
                        *out = amplitude(black_box(220.0), black_box(t), kind, &mut rng);
                    }
                })
            });
        }
    }

    group.finish();
}
