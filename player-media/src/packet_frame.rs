// player-media/src/packet_frame.rs
//
// Thin cross-thread wrappers around ffmpeg-the-third's Packet/Frame types.
// The demuxer produces `Packet`, each decode stage consumes the matching
// variant and produces `VideoFrame`/`AudioFrame`; all three carry their own
// pts/duration in stream time base so downstream stages never have to reach
// back into the source stream to ask.

use ffmpeg_the_third as ffmpeg;

/// A demuxed packet routed to one of the stream-specific packet queues.
pub struct Packet {
    pub packet:       ffmpeg::Packet,
    pub stream_index: usize,
}

impl Packet {
    pub fn new(packet: ffmpeg::Packet, stream_index: usize) -> Self {
        Self { packet, stream_index }
    }
}

/// A decoded video frame, pts/duration already resolved to stream time base.
/// `Clone` (cheap refcounted buffer clone, same as `ffmpeg::frame::Video`)
/// lets the presentation loop peek the frame queue's head/tail without
/// popping, to decide whether it's time to present yet.
#[derive(Clone)]
pub struct VideoFrame {
    pub frame:    ffmpeg::frame::Video,
    pub pts:      i64,
    pub duration: i64,
}

impl VideoFrame {
    pub fn new(frame: ffmpeg::frame::Video, pts: i64, duration: i64) -> Self {
        Self { frame, pts, duration }
    }
}

/// A decoded audio frame, pts/duration already resolved to stream time base.
#[derive(Clone)]
pub struct AudioFrame {
    pub frame:    ffmpeg::frame::Audio,
    pub pts:      i64,
    pub duration: i64,
}

impl AudioFrame {
    pub fn new(frame: ffmpeg::frame::Audio, pts: i64, duration: i64) -> Self {
        Self { frame, pts, duration }
    }
}
