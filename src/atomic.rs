use std::sync::atomic::{AtomicU64, Ordering};

/// An `f64` stored as raw bits in an [`AtomicU64`].
///
/// Loads and stores are single machine words, so a reader never sees half of
/// a write.
#[derive(Debug)]
pub(crate) struct AtomicF64 {
    bits: AtomicU64,
}

impl AtomicF64 {
    pub(crate) fn new(value: f64) -> Self {
        Self {
            bits: AtomicU64::new(value.to_bits()),
        }
    }

    #[inline]
    pub(crate) fn load(&self, order: Ordering) -> f64 {
        f64::from_bits(self.bits.load(order))
    }

    #[inline]
    pub(crate) fn store(&self, value: f64, order: Ordering) {
        self.bits.store(value.to_bits(), order);
    }
}
