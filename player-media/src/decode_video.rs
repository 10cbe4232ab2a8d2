// player-media/src/decode_video.rs
//
// C7: video decode stage. One thread, one codec context, `Arc`-shared packet
// and frame queues. Drains every frame the codec will yield per packet
// before popping the next one (spec §4.6).

use std::sync::Arc;

use ffmpeg_the_third as ffmpeg;

use crate::packet_frame::{Packet, VideoFrame};
use crate::queue::Queue;
use crate::shared::SessionControl;

pub struct VideoDecodeStage {
    pub decoder: ffmpeg::decoder::Video,
    pub pkt_q:   Arc<Queue<Packet>>,
    pub frame_q: Arc<Queue<VideoFrame>>,
    pub control: Arc<SessionControl>,
}

impl VideoDecodeStage {
    pub fn run(mut self) {
        loop {
            if self.control.is_aborted() {
                return;
            }
            let Some(pkt) = self.pkt_q.pop() else {
                // Nothing buffered; let the demuxer make progress and retry.
                self.control.wake_readers();
                std::thread::sleep(std::time::Duration::from_micros(200));
                continue;
            };

            if let Err(e) = self.decoder.send_packet(&pkt.packet) {
                eprintln!("[decode:video] send_packet: {e}");
                return;
            }

            if !self.drain_frames() {
                return;
            }
        }
    }

    /// Returns false when a non-EAGAIN/EOF error terminates the stage.
    fn drain_frames(&mut self) -> bool {
        let mut frame = ffmpeg::frame::Video::empty();
        loop {
            match self.decoder.receive_frame(&mut frame) {
                Ok(()) => {
                    let pts = frame.pts().unwrap_or(0);
                    // Duration isn't reliably carried on decoded video frames;
                    // the presenter derives nominal frame duration from the
                    // pts delta between consecutive frames (spec §4.8 fallback).
                    self.frame_q.push(VideoFrame::new(frame, pts, 0));
                    frame = ffmpeg::frame::Video::empty();
                }
                Err(ffmpeg::Error::Other { errno }) if errno == ffmpeg::util::error::EAGAIN => {
                    return true;
                }
                Err(ffmpeg::Error::Eof) => {
                    return true;
                }
                Err(e) => {
                    eprintln!("[decode:video] receive_frame: {e}");
                    return false;
                }
            }
        }
    }
}
