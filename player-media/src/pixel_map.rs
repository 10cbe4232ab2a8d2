// player-media/src/pixel_map.rs
//
// Mapping tables between the codec library's pixel/sample format enums and
// the presenter/sink's own format codes (spec §6, "Pixel/sample format
// mapping"). Kept as a standalone module so both the video presenter and the
// audio sink can consult it without depending on each other.

use ffmpeg_the_third::format::Pixel;
use ffmpeg_the_third::format::Sample;

/// Texture format the video presenter is asked to create/update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresenterTextureFormat {
    Yv12,
    Yuy2,
    Iyuv,
    Rgb24,
    Bgr24,
    Rgba32,
    Bgra32,
    Argb32,
    Abgr32,
    Unknown,
}

pub fn map_pixel_format(fmt: Pixel) -> PresenterTextureFormat {
    use PresenterTextureFormat::*;
    match fmt {
        Pixel::YUVJ420P | Pixel::YUV420P => Yv12,
        Pixel::YUV422P => Yuy2,
        Pixel::YUV444P => Iyuv,
        Pixel::RGB24 => Rgb24,
        Pixel::BGR24 => Bgr24,
        Pixel::RGBA => Rgba32,
        Pixel::BGRA => Bgra32,
        Pixel::ARGB => Argb32,
        Pixel::ABGR => Abgr32,
        _ => Unknown,
    }
}

/// Sample format the audio sink's device buffer is filled with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkSampleFormat {
    S16Sys,
    S32Sys,
    F32Sys,
    Unusable,
}

pub fn map_sample_format(fmt: Sample) -> SinkSampleFormat {
    match fmt {
        Sample::I16(_) => SinkSampleFormat::S16Sys,
        Sample::I32(_) => SinkSampleFormat::S32Sys,
        Sample::F32(_) => SinkSampleFormat::F32Sys,
        _ => SinkSampleFormat::Unusable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_pixel_formats() {
        assert_eq!(map_pixel_format(Pixel::YUV420P), PresenterTextureFormat::Yv12);
        assert_eq!(map_pixel_format(Pixel::YUVJ420P), PresenterTextureFormat::Yv12);
        assert_eq!(map_pixel_format(Pixel::YUV422P), PresenterTextureFormat::Yuy2);
        assert_eq!(map_pixel_format(Pixel::YUV444P), PresenterTextureFormat::Iyuv);
        assert_eq!(map_pixel_format(Pixel::RGBA), PresenterTextureFormat::Rgba32);
    }

    #[test]
    fn unknown_pixel_format_maps_to_unknown() {
        assert_eq!(map_pixel_format(Pixel::NV12), PresenterTextureFormat::Unknown);
    }

    #[test]
    fn maps_known_sample_formats() {
        assert_eq!(map_sample_format(Sample::I16(ffmpeg_the_third::format::sample::Type::Packed)), SinkSampleFormat::S16Sys);
        assert_eq!(map_sample_format(Sample::F32(ffmpeg_the_third::format::sample::Type::Planar)), SinkSampleFormat::F32Sys);
    }
}
