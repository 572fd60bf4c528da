//! Benchmarks for the DSP primitives and the note pipeline.

mod envelope;
mod oscillator;
mod sample;

pub use envelope::bench_envelope;
pub use oscillator::bench_oscillator;
pub use sample::bench_sample;
