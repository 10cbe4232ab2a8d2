// player-media/src/filters.rs
//
// C4: stateful scaler/resampler wrappers. Each holds the descriptor it was
// last built for and only rebuilds the underlying ffmpeg context when that
// descriptor changes or the context is missing — never unconditionally, and
// never only-on-negation (see the noted-not-fixed bug in the design notes
// this corpus carries forward: a `!ctx.is_some()`-style check would always
// reinit; the contract here is "changed or missing").

use anyhow::{anyhow, Result};

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::Pixel;
use ffmpeg::software::resampling::context::Context as SwrContext;
use ffmpeg::software::scaling::{context::Context as SwsContext, flag::Flags};
use ffmpeg::util::channel_layout::ChannelLayout;
use ffmpeg::util::format::sample::Sample;

#[derive(Clone, Copy, PartialEq, Eq)]
struct ScaleDescriptor {
    in_w: u32,
    in_h: u32,
    in_fmt: Pixel,
    out_w: u32,
    out_h: u32,
    out_fmt: Pixel,
}

/// Video scaler, re-initialized whenever the (in, out) descriptor changes.
pub struct VideoScaler {
    last: Option<ScaleDescriptor>,
    ctx:  Option<SwsContext>,
}

impl VideoScaler {
    pub fn new() -> Self {
        Self { last: None, ctx: None }
    }

    pub fn init(
        &mut self,
        in_w: u32, in_h: u32, in_fmt: Pixel,
        out_w: u32, out_h: u32, out_fmt: Pixel,
    ) -> Result<()> {
        let desc = ScaleDescriptor { in_w, in_h, in_fmt, out_w, out_h, out_fmt };
        if self.ctx.is_some() && self.last == Some(desc) {
            return Ok(());
        }
        let ctx = SwsContext::get(in_fmt, in_w, in_h, out_fmt, out_w, out_h, Flags::BILINEAR)
            .map_err(|e| anyhow!("scaler init: {e}"))?;
        self.ctx = Some(ctx);
        self.last = Some(desc);
        Ok(())
    }

    /// Scales `src` into a freshly allocated destination frame sized to the
    /// last `init` call's output descriptor. Destination allocation is the
    /// filter's responsibility (spec §4.4 — `image_alloc` for video).
    pub fn run(&mut self, src: &ffmpeg::frame::Video) -> Result<ffmpeg::frame::Video> {
        let desc = self.last.ok_or_else(|| anyhow!("scaler not initialized"))?;
        let ctx = self.ctx.as_mut().ok_or_else(|| anyhow!("scaler context missing"))?;
        let mut dst = ffmpeg::frame::Video::new(desc.out_fmt, desc.out_w, desc.out_h);
        ctx.run(src, &mut dst).map_err(|e| anyhow!("scale run: {e}"))?;
        Ok(dst)
    }

    pub fn is_initialized(&self) -> bool {
        self.ctx.is_some()
    }
}

impl Default for VideoScaler {
    fn default() -> Self { Self::new() }
}

#[derive(Clone, Copy, PartialEq, Eq)]
struct ResampleDescriptor {
    in_rate: u32,
    in_fmt: Sample,
    in_layout: ChannelLayout,
    out_rate: u32,
    out_fmt: Sample,
    out_layout: ChannelLayout,
}

/// Audio resampler, re-initialized on descriptor change. `run` grows its own
/// scratch output buffer as needed (spec §4.4).
pub struct AudioResampler {
    last: Option<ResampleDescriptor>,
    ctx:  Option<SwrContext>,
    scratch: Vec<u8>,
}

impl AudioResampler {
    pub fn new() -> Self {
        Self { last: None, ctx: None, scratch: Vec::new() }
    }

    pub fn init(
        &mut self,
        in_rate: u32, in_fmt: Sample, in_layout: ChannelLayout,
        out_rate: u32, out_fmt: Sample, out_layout: ChannelLayout,
    ) -> Result<()> {
        let desc = ResampleDescriptor { in_rate, in_fmt, in_layout, out_rate, out_fmt, out_layout };
        if self.ctx.is_some() && self.last == Some(desc) {
            return Ok(());
        }
        let ctx = SwrContext::get(in_fmt, in_layout, in_rate, out_fmt, out_layout, out_rate)
            .map_err(|e| anyhow!("resampler init: {e}"))?;
        self.ctx = Some(ctx);
        self.last = Some(desc);
        Ok(())
    }

    /// Resamples `src` into interleaved bytes at the last `init` call's output
    /// format, returning the number of bytes produced from the internal
    /// scratch buffer, which is grown (never shrunk) to fit.
    pub fn run(&mut self, src: &ffmpeg::frame::Audio) -> Result<&[u8]> {
        self.last.ok_or_else(|| anyhow!("resampler not initialized"))?;
        let ctx = self.ctx.as_mut().ok_or_else(|| anyhow!("resampler context missing"))?;
        let mut dst = ffmpeg::frame::Audio::empty();
        ctx.run(src, &mut dst).map_err(|e| anyhow!("resample run: {e}"))?;

        let bytes_needed = dst.data(0).len();
        if self.scratch.len() < bytes_needed {
            self.scratch.resize(bytes_needed, 0);
        }
        self.scratch[..bytes_needed].copy_from_slice(&dst.data(0)[..bytes_needed]);
        Ok(&self.scratch[..bytes_needed])
    }

    pub fn is_initialized(&self) -> bool {
        self.ctx.is_some()
    }
}

impl Default for AudioResampler {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_scaler_is_not_initialized() {
        let s = VideoScaler::new();
        assert!(!s.is_initialized());
    }

    #[test]
    fn fresh_resampler_is_not_initialized() {
        let r = AudioResampler::new();
        assert!(!r.is_initialized());
    }
}
