// player-media/src/sync.rs
//
// C10: sync controller. Pure arithmetic over clock readings and the last
// frame's duration — no I/O, no threads, so it is exhaustively unit-tested
// here rather than only exercised through the presenter loop.

/// Minimum/maximum frame delay correction threshold, seconds.
pub const AV_SYNC_THRESHOLD_MIN: f64 = 0.04;
pub const AV_SYNC_THRESHOLD_MAX: f64 = 0.10;
/// Beyond this much drift the controller gives up chasing (spec §4.8).
pub const AV_NOSYNC_THRESHOLD: f64 = 10.0;

/// `delay` is the frame's nominal duration in seconds (already resolved from
/// `last_frame_duration_pts * video_time_base`, with the fallback chain from
/// spec §4.8 applied by the caller). Returns the corrected delay to sleep.
pub fn sync_delay(delay: f64, video_clock: f64, audio_clock: f64) -> f64 {
    let thr = delay.clamp(AV_SYNC_THRESHOLD_MIN, AV_SYNC_THRESHOLD_MAX);
    let diff = video_clock - audio_clock;

    if diff.abs() >= AV_NOSYNC_THRESHOLD {
        return delay;
    }
    if diff <= -thr {
        // video is late: shorten, but never negative.
        (delay + diff).max(0.0)
    } else if diff >= thr {
        if delay > AV_SYNC_THRESHOLD_MAX {
            // frame is already long; keep it long rather than doubling further.
            delay + diff
        } else {
            // frame is short; double to let audio catch up.
            2.0 * delay
        }
    } else {
        delay
    }
}

/// Video-only pacemaker: `1/frame_rate/speed` less whatever elapsed already
/// since the previous call, clamped to non-negative (spec §4.8, "else" arm).
pub fn pacemaker_delay(frame_rate: f64, speed: f64, elapsed_since_last: f64) -> f64 {
    if frame_rate <= 0.0 || speed <= 0.0 {
        return 0.0;
    }
    (1.0 / frame_rate / speed - elapsed_since_last).max(0.0)
}

/// Resolves the nominal per-frame delay from the fallback chain in spec §4.8:
/// prefer `last_frame_duration_pts * time_base`; else the gap to the next
/// queued frame's pts (clamped to `[0, 1]`); else the frame's own duration.
pub fn resolve_nominal_delay(
    last_frame_duration_pts: i64,
    time_base: f64,
    next_peek_pts: Option<i64>,
    prev_pts: i64,
    frame_duration_pts: i64,
) -> f64 {
    if last_frame_duration_pts > 0 {
        return last_frame_duration_pts as f64 * time_base;
    }
    if let Some(next_pts) = next_peek_pts {
        let gap = (next_pts - prev_pts) as f64 * time_base;
        if gap > 0.0 {
            return gap.clamp(0.0, 1.0);
        }
    }
    frame_duration_pts as f64 * time_base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_sync_keeps_nominal_delay() {
        let d = sync_delay(0.04, 10.0, 10.0);
        assert_eq!(d, 0.04);
    }

    #[test]
    fn video_late_shortens_delay() {
        // video_clock behind audio_clock by 0.2s, well past threshold.
        let d = sync_delay(0.04, 9.8, 10.0);
        assert!((d - (0.04 - 0.2).max(0.0)).abs() < 1e-9);
        assert_eq!(d, 0.0); // clamped, delay + diff would be negative
    }

    #[test]
    fn video_early_short_frame_doubles() {
        let d = sync_delay(0.04, 10.2, 10.0);
        assert_eq!(d, 0.08);
    }

    #[test]
    fn video_early_long_frame_keeps_long() {
        let d = sync_delay(0.2, 10.2, 10.0);
        assert_eq!(d, 0.2 + 0.2);
    }

    #[test]
    fn gross_drift_gives_up_correction() {
        let d = sync_delay(0.04, 25.0, 10.0);
        assert_eq!(d, 0.04);
    }

    #[test]
    fn pacemaker_subtracts_elapsed_and_floors_at_zero() {
        let d = pacemaker_delay(25.0, 1.0, 0.5);
        assert!(d >= 0.0);
        let all_consumed = pacemaker_delay(25.0, 1.0, 10.0);
        assert_eq!(all_consumed, 0.0);
    }

    #[test]
    fn nominal_delay_prefers_last_duration() {
        let d = resolve_nominal_delay(1000, 0.001, Some(5000), 0, 500);
        assert_eq!(d, 1.0);
    }

    #[test]
    fn nominal_delay_falls_back_to_peek_gap_clamped() {
        let d = resolve_nominal_delay(0, 0.001, Some(5000), 0, 500);
        assert_eq!(d, 1.0); // 5000 * 0.001 = 5.0, clamped to 1.0
    }

    #[test]
    fn nominal_delay_falls_back_to_own_duration() {
        let d = resolve_nominal_delay(0, 0.001, None, 0, 500);
        assert_eq!(d, 0.5);
    }
}
