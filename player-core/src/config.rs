// player-core/src/config.rs
//
// PlayerConfig and its nested sections — pure data, no ffmpeg, no threads.
// Validated once by `PlayerConfig::validate()` at `Player::init`, matching
// the "Configuration invalid" error kind from spec §7.

use serde::{Deserialize, Serialize};

use crate::error::PlayerError;

/// A small rational, independent of the codec library's own rational type.
/// player-media converts to/from `ffmpeg_the_third::Rational` at the seam.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rational {
    pub num: i32,
    pub den: i32,
}

impl Rational {
    pub const ZERO: Rational = Rational { num: 0, den: 1 };

    pub fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    pub fn as_f64(self) -> f64 {
        if self.den == 0 { 0.0 } else { self.num as f64 / self.den as f64 }
    }

    pub fn is_valid(self) -> bool {
        self.num != 0 && self.den != 0
    }
}

/// Pixel format hint carried in config and at the demuxer/decoder seam.
/// Mirrors the mapping table in spec §6 ("Pixel/sample format mapping").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormatHint {
    Yuv420p,
    YuvJ420p,
    Yuv422p,
    Yuv444p,
    Rgb24,
    Bgr24,
    Rgba,
    Bgra,
    Argb,
    Abgr,
    Unknown,
}

impl Default for PixelFormatHint {
    fn default() -> Self { PixelFormatHint::Yuv420p }
}

/// Fixed at the audio sink boundary to S16 regardless of what is requested
/// here — kept as a config field only because it is a recognized option
/// (spec §6); the decode/resample path always converges on S16.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioSampleFormat {
    S16,
    S32,
    Flt,
}

impl Default for AudioSampleFormat {
    fn default() -> Self { AudioSampleFormat::S16 }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopMode {
    NoLoop,
    LoopList,
    LoopSingle,
    LoopBoth,
}

impl Default for LoopMode {
    fn default() -> Self { LoopMode::NoLoop }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VideoConfig {
    /// -1 means "derive from source / aspect rules in setWidthAndHeight".
    pub width:              i32,
    pub height:             i32,
    pub frame_rate:         Rational,
    pub format:             PixelFormatHint,
    pub sample_aspect_ratio: Rational,
    pub xleft:              i32,
    pub ytop:                i32,
    pub max_width:           i32,
    pub max_height:          i32,
    pub keep_raw_ratio:      bool,
    pub auto_fit:            bool,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: -1,
            height: -1,
            frame_rate: Rational::new(25, 1),
            format: PixelFormatHint::default(),
            sample_aspect_ratio: Rational::ZERO,
            xleft: 0,
            ytop: 0,
            max_width: 1920,
            max_height: 1080,
            keep_raw_ratio: true,
            auto_fit: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AudioConfig {
    /// <= 0 means "take from stream".
    pub sample_rate: i32,
    pub channels:    i32,
    pub format:      AudioSampleFormat,
    pub volume:      f32,
    pub is_muted:    bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 0,
            channels: 2,
            format: AudioSampleFormat::default(),
            volume: 1.0,
            is_muted: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommonConfig {
    pub enable_audio:          bool,
    pub enable_video:          bool,
    pub enable_subtitle:       bool,
    pub seek_step:             f64,
    pub force_idr:             bool,
    pub speed:                 f64,
    pub loop_mode:             LoopMode,
    pub auto_read_next_media:  bool,
    pub save_while_playing:    bool,
    pub save_file:             Option<std::path::PathBuf>,
    pub track_mode:            bool,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            enable_audio: true,
            enable_video: true,
            enable_subtitle: false,
            seek_step: 5.0,
            force_idr: false,
            speed: 1.0,
            loop_mode: LoopMode::default(),
            auto_read_next_media: true,
            save_while_playing: false,
            save_file: None,
            track_mode: false,
        }
    }
}

/// Grabber knobs for device sources (screen/camera capture). Only consulted
/// when `MediaSource::input_format_hint` selects a device demuxer.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GrabberOptions {
    pub framerate:  f64,
    pub draw_mouse: bool,
    pub video_size: Option<(u32, u32)>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub video:  VideoConfig,
    pub audio:  AudioConfig,
    pub common: CommonConfig,
}

impl PlayerConfig {
    /// Validation rules from spec §4.9: `channels > 0`, `0 <= volume <= 5.0`,
    /// `0 < speed <= 2.0`. Out-of-range fails `init()` with no side effects.
    pub fn validate(&self) -> Result<(), PlayerError> {
        if self.audio.channels <= 0 {
            return Err(PlayerError::InvalidConfig(
                format!("channels must be > 0, got {}", self.audio.channels)));
        }
        if !(0.0..=5.0).contains(&self.audio.volume) {
            return Err(PlayerError::InvalidConfig(
                format!("volume must be in [0, 5.0], got {}", self.audio.volume)));
        }
        if !(self.common.speed > 0.0 && self.common.speed <= 2.0) {
            return Err(PlayerError::InvalidConfig(
                format!("speed must be in (0, 2.0], got {}", self.common.speed)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(PlayerConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_channels() {
        let mut cfg = PlayerConfig::default();
        cfg.audio.channels = 0;
        assert!(matches!(cfg.validate(), Err(PlayerError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_volume_out_of_range() {
        let mut cfg = PlayerConfig::default();
        cfg.audio.volume = 5.1;
        assert!(cfg.validate().is_err());
        cfg.audio.volume = -0.1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_speed_out_of_range() {
        let mut cfg = PlayerConfig::default();
        cfg.common.speed = 0.0;
        assert!(cfg.validate().is_err());
        cfg.common.speed = 2.1;
        assert!(cfg.validate().is_err());
        cfg.common.speed = 2.0;
        assert!(cfg.validate().is_ok());
    }
}
