use std::sync::atomic::{AtomicU32, Ordering};
use crate::common::DEFAULT_CONF_THRESHOLD;

/// Confidence threshold shared between the UI side and the detection worker.
///
/// Stored as the bit pattern of an `f32` so a read never sees a torn value. Relaxed
/// ordering: a new value only has to show up from the next frame on.
#[derive(Debug)]
pub struct ConfidenceThreshold(AtomicU32);

impl ConfidenceThreshold {
    pub fn new(threshold: f32) -> Self {
        Self(AtomicU32::new(threshold.to_bits()))
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    /// Any value is accepted, values outside `[0, 1]` just make the filter accept all or nothing.
    pub fn set(&self, threshold: f32) {
        self.0.store(threshold.to_bits(), Ordering::Relaxed);
    }

    /// A detection passes when its score is strictly above the threshold.
    pub fn check_conf(threshold: f32, conf: f32) -> bool {
        conf > threshold
    }
}

impl Default for ConfidenceThreshold {
    fn default() -> Self {
        Self::new(DEFAULT_CONF_THRESHOLD)
    }
}
