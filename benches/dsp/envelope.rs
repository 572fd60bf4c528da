//! Benchmarks for ADSR envelope queries.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use monosynth::dsp::envelope::{Envelope, EnvelopeConfig};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f64; size];

        // Attack phase (ramping up)
        let env = Envelope::new(EnvelopeConfig::new(0.1, 0.1, 0.3, 1.0, 0.7).unwrap()).unwrap();
        env.trigger(0.0);
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| render(&env, black_box(0.0), &mut buffer))
        });

        // Sustain phase (holding steady)
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| render(&env, black_box(1.0), &mut buffer))
        });

        // Release phase (ramping down)
        let env = Envelope::new(EnvelopeConfig::new(0.001, 0.001, 0.1, 1.0, 0.7).unwrap()).unwrap();
        env.trigger(0.0);
        env.release(1.0);
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| render(&env, black_box(1.0), &mut buffer))
        });
    }

    group.finish();
}

fn render(env: &Envelope, start: f64, buffer: &mut [f64]) {
    for (i, out) in buffer.iter_mut().enumerate() {
        *out = env.amplitude_at(start + i as f64 / SAMPLE_RATE);
    }
}
