// player-core/src/helpers/time.rs
//
// Time-unit conversions (spec §9 "Unit conversions"): seconds (f64) are used
// everywhere in the public API and the two clocks; the codec library's own
// microsecond scale is only touched at the demuxer seek boundary.

/// The codec library's seek/duration scale (AV_TIME_BASE), microseconds.
pub const AV_TIME_BASE: i64 = 1_000_000;

pub fn seconds_to_av_ts(seconds: f64) -> i64 {
    (seconds * AV_TIME_BASE as f64) as i64
}

pub fn av_ts_to_seconds(ts: i64) -> f64 {
    ts as f64 / AV_TIME_BASE as f64
}

/// Format a duration in seconds as `MM:SS:FF` (minutes, seconds, frames at
/// 30fps) — used by the UI transport bar timecode readout.
///
/// ```
/// use player_core::helpers::time::format_timecode;
/// assert_eq!(format_timecode(0.0),  "00:00:00");
/// assert_eq!(format_timecode(61.5), "01:01:15");
/// ```
pub fn format_timecode(s: f64) -> String {
    let s = s.max(0.0);
    let m  = (s / 60.0) as u32;
    let sc = (s % 60.0) as u32;
    let fr = ((s * 30.0) as u32) % 30;
    format!("{m:02}:{sc:02}:{fr:02}")
}

/// Compact human-readable duration, used in playlist rows.
///
/// ```
/// use player_core::helpers::time::format_duration;
/// assert_eq!(format_duration(4.2),   "4.2s");
/// assert_eq!(format_duration(187.0), "3:07");
/// ```
pub fn format_duration(secs: f64) -> String {
    let secs = secs.max(0.0);
    if secs >= 3600.0 {
        format!("{}:{:02}:{:02}", secs as u64 / 3600, (secs as u64 % 3600) / 60, secs as u64 % 60)
    } else if secs >= 60.0 {
        format!("{}:{:02}", secs as u64 / 60, secs as u64 % 60)
    } else {
        format!("{secs:.1}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_av_ts() {
        let secs = 12.345;
        let back = av_ts_to_seconds(seconds_to_av_ts(secs));
        assert!((back - secs).abs() < 1e-6);
    }

    #[test]
    fn negative_seconds_clamp_to_zero_display() {
        assert_eq!(format_timecode(-1.0), "00:00:00");
        assert_eq!(format_duration(-1.0), "0.0s");
    }
}
