// player-media/src/clock.rs
//
// C2: media clock — a single `f64` seconds value, written only by the stage
// that owns it (audio presentation writes `audio_clock`; video decode writes
// `video_clock`), read without locking by the sync controller. Tearing is
// acceptable (spec §3): a stale f64 cannot desync more than one frame.

use std::sync::atomic::{AtomicU64, Ordering};

/// A racy-by-design scalar clock. Stored as bits-of-f64 in an AtomicU64 so
/// reads/writes are at least word-atomic (no torn half-updates across
/// unrelated bytes), matching the "racy by design" contract in spec §5
/// without inviting actual undefined behavior from a non-atomic f64.
pub struct MediaClock {
    bits: AtomicU64,
}

impl MediaClock {
    pub fn new() -> Self {
        Self { bits: AtomicU64::new(f64::NEG_INFINITY.to_bits()) }
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    pub fn set(&self, pts_seconds: f64) {
        self.bits.store(pts_seconds.to_bits(), Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.bits.store(f64::NEG_INFINITY.to_bits(), Ordering::Relaxed);
    }

    /// True once `set` has been called at least once since construction/reset.
    pub fn is_valid(&self) -> bool {
        self.get().is_finite()
    }
}

impl Default for MediaClock {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_clock_is_invalid() {
        let c = MediaClock::new();
        assert!(!c.is_valid());
    }

    #[test]
    fn set_then_get_roundtrips() {
        let c = MediaClock::new();
        c.set(12.5);
        assert_eq!(c.get(), 12.5);
        assert!(c.is_valid());
    }

    #[test]
    fn reset_invalidates() {
        let c = MediaClock::new();
        c.set(3.0);
        c.reset();
        assert!(!c.is_valid());
    }
}
