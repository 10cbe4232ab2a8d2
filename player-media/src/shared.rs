// player-media/src/shared.rs
//
// Coordination primitives shared by reference across the demuxer, decode,
// and presentation threads. The player state machine owns one of these per
// open session and joins every thread before dropping it (spec §9 — "no
// cycles": stages borrow, the state machine owns).

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// Cooperative cancellation + pause/seek signaling consulted by every stage.
pub struct SessionControl {
    pub aborted: AtomicBool,
    pub paused:  AtomicBool,
    pub eof:     AtomicBool,
    /// Seek target in seconds, `None` when no seek is pending.
    seek_target: Mutex<Option<f64>>,
    /// Woken whenever abort/pause/seek/queue-drain state changes so the
    /// demuxer's bounded wait (spec §4.5 step 3, ~10 µs) can wake early.
    continue_read_cv: Condvar,
    continue_read_lock: Mutex<()>,
    /// +1 = play_next requested, -1 = play_prev requested, 0 = none.
    pub playlist_direction: AtomicI32,
}

impl SessionControl {
    pub fn new() -> Self {
        Self {
            aborted: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            eof: AtomicBool::new(false),
            seek_target: Mutex::new(None),
            continue_read_cv: Condvar::new(),
            continue_read_lock: Mutex::new(()),
            playlist_direction: AtomicI32::new(0),
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
        self.wake_readers();
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::SeqCst);
        self.wake_readers();
    }

    pub fn request_seek(&self, target_seconds: f64) {
        *self.seek_target.lock() = Some(target_seconds);
        self.wake_readers();
    }

    /// Takes and clears the pending seek target, if any.
    pub fn take_seek(&self) -> Option<f64> {
        self.seek_target.lock().take()
    }

    pub fn has_pending_seek(&self) -> bool {
        self.seek_target.lock().is_some()
    }

    pub fn set_eof(&self, eof: bool) {
        self.eof.store(eof, Ordering::SeqCst);
    }

    pub fn is_eof(&self) -> bool {
        self.eof.load(Ordering::SeqCst)
    }

    /// Bounded wait used by the demuxer while packet queues are full or the
    /// session is paused (spec §4.5 step 3 / §5 "Suspension points").
    pub fn wait_continue_read(&self, timeout: Duration) {
        let mut guard = self.continue_read_lock.lock();
        self.continue_read_cv.wait_for(&mut guard, timeout);
    }

    pub fn wake_readers(&self) {
        self.continue_read_cv.notify_all();
    }

    pub fn request_play_next(&self) {
        self.playlist_direction.store(1, Ordering::SeqCst);
        self.abort();
    }

    pub fn request_play_prev(&self) {
        self.playlist_direction.store(-1, Ordering::SeqCst);
        self.abort();
    }

    pub fn take_playlist_direction(&self) -> i32 {
        self.playlist_direction.swap(0, Ordering::SeqCst)
    }
}

impl Default for SessionControl {
    fn default() -> Self { Self::new() }
}

/// Minimal pause/resume surface the demuxer needs from the audio sink during
/// a seek (spec §4.5 step 2, §5 "Pause discipline") without depending on the
/// sink's concrete backend (cpal vs. a future alternative).
pub trait AudioPauseControl: Send + Sync {
    fn pause_callback(&self);
    fn resume_callback(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seek_request_round_trips_and_clears() {
        let ctl = SessionControl::new();
        assert!(!ctl.has_pending_seek());
        ctl.request_seek(12.5);
        assert!(ctl.has_pending_seek());
        assert_eq!(ctl.take_seek(), Some(12.5));
        assert!(!ctl.has_pending_seek());
    }

    #[test]
    fn abort_sets_flag() {
        let ctl = SessionControl::new();
        assert!(!ctl.is_aborted());
        ctl.abort();
        assert!(ctl.is_aborted());
    }

    #[test]
    fn playlist_direction_defaults_to_none_and_clears_on_take() {
        let ctl = SessionControl::new();
        assert_eq!(ctl.take_playlist_direction(), 0);
        ctl.request_play_next();
        assert_eq!(ctl.take_playlist_direction(), 1);
        assert_eq!(ctl.take_playlist_direction(), 0);
        ctl.request_play_prev();
        assert_eq!(ctl.take_playlist_direction(), -1);
    }
}
