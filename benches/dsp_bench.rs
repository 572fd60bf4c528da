//! Benchmarks for the waveform generator, the envelope, and full sample
//! production.
//!
//! Run with: cargo bench
//!
//! Every sample is computed inside the audio callback, so what matters is
//! the cost per block against the realtime deadline.
//!
//! Reference timing at 44.1kHz sample rate:
//!   - 128 samples = 2.90ms deadline
//!   - 512 samples = 11.61ms deadline
//!
//! Benchmark groups:
//!   - dsp/*        Waveforms and envelope queries
//!   - synth/*      Envelope × waveform × volume per sample

use criterion::{criterion_group, criterion_main};

mod dsp;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[128, 512];

pub const SAMPLE_RATE: f64 = 44_100.0;

criterion_group!(
    benches,
    dsp::bench_oscillator,
    dsp::bench_envelope,
    dsp::bench_sample,
);
criterion_main!(benches);
