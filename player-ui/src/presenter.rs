// player-ui/src/presenter.rs
//
// egui-backed implementation of player_media::VideoPresenter. egui only
// accepts RGBA8 textures, so every plane layout the codec library hands us
// (YV12/YUY2/IYUV planar YUV, or one of the packed RGB variants) is converted
// to a tightly packed RGBA buffer here before upload — the "update_texture" /
// "update_yuv_texture" split from spec §6 collapses into one conversion step
// because the target toolkit has no native YUV texture path.
//
// Keyboard/window events are collected into a shared queue by `app.rs` each
// egui frame (via `ctx.input(|i| i.key_pressed(..))`, the same edge-triggered
// pattern the teacher's timeline/library panels use) and drained here by
// `poll_events`, which `Player::tick()` calls once per tick.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use egui::{Color32, ColorImage, Context, TextureHandle, TextureOptions};

use player_media::pixel_map::PresenterTextureFormat;
use player_media::presenter::{PresentedFrame, PresenterEvent, VideoPresenter};

pub type EventQueue = Rc<RefCell<VecDeque<PresenterEvent>>>;

pub struct EguiPresenter {
    ctx: Context,
    texture: Option<TextureHandle>,
    events: EventQueue,
}

impl EguiPresenter {
    pub fn new(ctx: Context, events: EventQueue) -> Self {
        Self { ctx, texture: None, events }
    }

    pub fn texture(&self) -> Option<&TextureHandle> {
        self.texture.as_ref()
    }
}

impl VideoPresenter for EguiPresenter {
    fn ensure_texture(&mut self, width: u32, height: u32, _format: PresenterTextureFormat) {
        if width == 0 || height == 0 {
            return;
        }
        if self.texture.is_none() {
            let blank = ColorImage::new([width as usize, height as usize], Color32::BLACK);
            self.texture = Some(self.ctx.load_texture("player-frame", blank, TextureOptions::LINEAR));
        }
    }

    fn present(&mut self, frame: PresentedFrame<'_>) {
        if frame.format == PresenterTextureFormat::Unknown {
            eprintln!("[presenter] dropping frame: unmappable pixel format");
            return;
        }
        let rgba = to_rgba(&frame);
        let image = ColorImage::from_rgba_unmultiplied(
            [frame.width as usize, frame.height as usize],
            &rgba,
        );
        match &mut self.texture {
            Some(tex) => tex.set(image, TextureOptions::LINEAR),
            None => {
                self.texture = Some(self.ctx.load_texture("player-frame", image, TextureOptions::LINEAR));
            }
        }
    }

    fn poll_events(&mut self) -> Vec<PresenterEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    fn destroy_texture(&mut self) {
        self.texture = None;
    }
}

/// Chroma plane dimensions for a YUV `format`, derived from the luma
/// (width, height) per spec §6's pixel mapping (Yv12 = 4:2:0, Yuy2 = 4:2:2
/// planar here since all three planes already arrive separately, Iyuv = 4:4:4
/// under this mapping table).
fn chroma_dims(format: PresenterTextureFormat, width: u32, height: u32) -> (u32, u32) {
    match format {
        PresenterTextureFormat::Yv12 => ((width + 1) / 2, (height + 1) / 2),
        PresenterTextureFormat::Yuy2 => ((width + 1) / 2, height),
        _ => (width, height),
    }
}

/// Converts one presented frame into tightly packed RGBA8, honoring each
/// plane's row stride (the codec library pads rows to an alignment boundary;
/// slicing by `width` alone would skew the image once stride != width).
fn to_rgba(frame: &PresentedFrame<'_>) -> Vec<u8> {
    let w = frame.width as usize;
    let h = frame.height as usize;
    match frame.format {
        PresenterTextureFormat::Yv12 | PresenterTextureFormat::Yuy2 | PresenterTextureFormat::Iyuv => {
            yuv_to_rgba(frame, w, h)
        }
        PresenterTextureFormat::Rgb24 => packed_to_rgba(frame.planes[0], frame.strides[0], w, h, 3, [0, 1, 2]),
        PresenterTextureFormat::Bgr24 => packed_to_rgba(frame.planes[0], frame.strides[0], w, h, 3, [2, 1, 0]),
        PresenterTextureFormat::Rgba32 => packed_to_rgba(frame.planes[0], frame.strides[0], w, h, 4, [0, 1, 2]),
        PresenterTextureFormat::Bgra32 => packed_to_rgba(frame.planes[0], frame.strides[0], w, h, 4, [2, 1, 0]),
        PresenterTextureFormat::Argb32 => packed_argb_to_rgba(frame.planes[0], frame.strides[0], w, h, [1, 2, 3], 0),
        PresenterTextureFormat::Abgr32 => packed_argb_to_rgba(frame.planes[0], frame.strides[0], w, h, [3, 2, 1], 0),
        PresenterTextureFormat::Unknown => vec![0u8; w * h * 4],
    }
}

/// BT.601 full-range YUV -> RGB, one plane per channel, each with its own
/// stride (see spec §4.4 / DESIGN.md on why strides are carried at all).
fn yuv_to_rgba(frame: &PresentedFrame<'_>, w: usize, h: usize) -> Vec<u8> {
    let (cw, ch) = chroma_dims(frame.format, w as u32, h as u32);
    let (cw, ch) = (cw as usize, ch.max(1) as usize);
    let y_plane = frame.planes[0];
    let u_plane = frame.planes[1];
    let v_plane = frame.planes[2];
    let y_stride = frame.strides[0];
    let u_stride = frame.strides[1];
    let v_stride = frame.strides[2];

    let sub_x = if w == 0 { 1 } else { (w + cw - 1) / cw.max(1) };
    let sub_y = if h == 0 { 1 } else { (h + ch - 1) / ch.max(1) };

    let mut out = vec![0u8; w * h * 4];
    for row in 0..h {
        let crow = (row / sub_y.max(1)).min(ch.saturating_sub(1));
        for col in 0..w {
            let ccol = (col / sub_x.max(1)).min(cw.saturating_sub(1));
            let y = y_plane.get(row * y_stride + col).copied().unwrap_or(0) as f32;
            let u = u_plane.get(crow * u_stride + ccol).copied().unwrap_or(128) as f32 - 128.0;
            let v = v_plane.get(crow * v_stride + ccol).copied().unwrap_or(128) as f32 - 128.0;

            let r = (y + 1.402 * v).round().clamp(0.0, 255.0) as u8;
            let g = (y - 0.344136 * u - 0.714136 * v).round().clamp(0.0, 255.0) as u8;
            let b = (y + 1.772 * u).round().clamp(0.0, 255.0) as u8;

            let o = (row * w + col) * 4;
            out[o] = r;
            out[o + 1] = g;
            out[o + 2] = b;
            out[o + 3] = 255;
        }
    }
    out
}

/// Copies a packed 3- or 4-byte-per-pixel plane into RGBA, reordering
/// channels per `order` (indices into the source pixel's bytes for R,G,B)
/// and filling alpha opaque.
fn packed_to_rgba(
    plane: &[u8],
    stride: usize,
    w: usize,
    h: usize,
    bpp: usize,
    order: [usize; 3],
) -> Vec<u8> {
    let mut out = vec![0u8; w * h * 4];
    for row in 0..h {
        let src_row = &plane[row * stride..];
        for col in 0..w {
            let s = col * bpp;
            if s + bpp > src_row.len() {
                break;
            }
            let o = (row * w + col) * 4;
            out[o] = src_row[s + order[0]];
            out[o + 1] = src_row[s + order[1]];
            out[o + 2] = src_row[s + order[2]];
            out[o + 3] = 255;
        }
    }
    out
}

/// Like `packed_to_rgba` but for 4-byte pixels carrying an explicit alpha
/// byte at `alpha_index` alongside the RGB `order`.
fn packed_argb_to_rgba(
    plane: &[u8],
    stride: usize,
    w: usize,
    h: usize,
    order: [usize; 3],
    alpha_index: usize,
) -> Vec<u8> {
    let mut out = vec![0u8; w * h * 4];
    for row in 0..h {
        let src_row = &plane[row * stride..];
        for col in 0..w {
            let s = col * 4;
            if s + 4 > src_row.len() {
                break;
            }
            let o = (row * w + col) * 4;
            out[o] = src_row[s + order[0]];
            out[o + 1] = src_row[s + order[1]];
            out[o + 2] = src_row[s + order[2]];
            out[o + 3] = src_row[s + alpha_index];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chroma_dims_yv12_halves_both_axes() {
        assert_eq!(chroma_dims(PresenterTextureFormat::Yv12, 640, 480), (320, 240));
    }

    #[test]
    fn chroma_dims_yuy2_halves_width_only() {
        assert_eq!(chroma_dims(PresenterTextureFormat::Yuy2, 640, 480), (320, 480));
    }

    #[test]
    fn chroma_dims_iyuv_is_full_resolution() {
        assert_eq!(chroma_dims(PresenterTextureFormat::Iyuv, 640, 480), (640, 480));
    }

    #[test]
    fn packed_rgb24_reorders_to_rgba() {
        let plane = [10u8, 20, 30]; // one BGR pixel
        let out = packed_to_rgba(&plane, 3, 1, 1, 3, [2, 1, 0]);
        assert_eq!(out, vec![30, 20, 10, 255]);
    }

    #[test]
    fn yuv_mid_gray_is_achromatic() {
        let planes: [&[u8]; 3] = [&[128], &[128], &[128]];
        let strides = [1usize, 1, 1];
        let frame = PresentedFrame {
            format: PresenterTextureFormat::Yv12,
            width: 1,
            height: 1,
            planes: &planes,
            strides: &strides,
        };
        let out = yuv_to_rgba(&frame, 1, 1);
        assert_eq!(out, vec![128, 128, 128, 255]);
    }
}
