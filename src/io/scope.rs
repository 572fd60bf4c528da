use rtrb::{Consumer, Producer, RingBuffer};

use crate::synth::SampleSource;

/// Passes samples through unchanged while copying each one into a ring
/// buffer for visualization.
///
/// The copy never blocks: when the reader falls behind, new samples are
/// dropped until it catches up.
pub struct ScopeTap<S> {
    inner: S,
    tx: Producer<f32>,
}

impl<S: SampleSource> ScopeTap<S> {
    pub fn new(inner: S, capacity: usize) -> (Self, Consumer<f32>) {
        let (tx, rx) = RingBuffer::new(capacity);
        (Self { inner, tx }, rx)
    }
}

impl<S: SampleSource> SampleSource for ScopeTap<S> {
    #[inline]
    fn sample(&mut self, time: f64) -> f32 {
        let value = self.inner.sample(time);
        let _ = self.tx.push(value);
        value
    }
}
