// player-media/src/presenter.rs
//
// The minimal video presenter interface the player core consumes (spec §6):
// create/update/destroy a texture, present, and report window-close/keyboard
// events back. player-ui implements this trait with an egui texture handle;
// player-media never depends on egui directly — it only sees this trait.

use crate::pixel_map::PresenterTextureFormat;

/// Keyboard/window events the presenter forwards (spec §6 event vocabulary).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresenterEvent {
    QuitOrEsc,
    TogglePause,
    SeekBack,
    SeekForward,
    PlayPrev,
    PlayNext,
    VolumeUp,
    VolumeDown,
    ToggleMute,
}

/// A single-plane or YUV pixel buffer ready to hand to the presenter.
pub struct PresentedFrame<'a> {
    pub format: PresenterTextureFormat,
    pub width:  u32,
    pub height: u32,
    /// One slice per plane; YUV formats (YV12/YUY2/IYUV) carry 3, everything
    /// else 1. Planes are as returned by the codec library — rows may be
    /// padded to a stride wider than the logical plane width.
    pub planes: &'a [&'a [u8]],
    /// Byte stride (row pitch) of each entry in `planes`, same length.
    pub strides: &'a [usize],
}

/// Implemented by the UI layer's texture-backed video canvas.
pub trait VideoPresenter {
    /// Creates or resizes the backing texture if the descriptor changed.
    fn ensure_texture(&mut self, width: u32, height: u32, format: PresenterTextureFormat);

    /// Uploads and displays one frame. Called from the presenter thread.
    fn present(&mut self, frame: PresentedFrame<'_>);

    /// Non-blocking poll for queued input/window events since the last call.
    fn poll_events(&mut self) -> Vec<PresenterEvent>;

    fn destroy_texture(&mut self);
}
