// player-media/src/decode_audio.rs
//
// C6: audio decode stage. Mirrors decode_video.rs's loop shape (spec §4.6)
// over the audio codec context and audio frame queue.

use std::sync::Arc;

use ffmpeg_the_third as ffmpeg;

use crate::packet_frame::{AudioFrame, Packet};
use crate::queue::Queue;
use crate::shared::SessionControl;

pub struct AudioDecodeStage {
    pub decoder: ffmpeg::decoder::Audio,
    pub pkt_q:   Arc<Queue<Packet>>,
    pub frame_q: Arc<Queue<AudioFrame>>,
    pub control: Arc<SessionControl>,
}

impl AudioDecodeStage {
    pub fn run(mut self) {
        loop {
            if self.control.is_aborted() {
                return;
            }
            let Some(pkt) = self.pkt_q.pop() else {
                self.control.wake_readers();
                std::thread::sleep(std::time::Duration::from_micros(200));
                continue;
            };

            if let Err(e) = self.decoder.send_packet(&pkt.packet) {
                eprintln!("[decode:audio] send_packet: {e}");
                return;
            }

            if !self.drain_frames() {
                return;
            }
        }
    }

    fn drain_frames(&mut self) -> bool {
        let mut frame = ffmpeg::frame::Audio::empty();
        loop {
            match self.decoder.receive_frame(&mut frame) {
                Ok(()) => {
                    let pts = frame.pts().unwrap_or(0);
                    let duration = frame.samples() as i64;
                    self.frame_q.push(AudioFrame::new(frame, pts, duration));
                    frame = ffmpeg::frame::Audio::empty();
                }
                Err(ffmpeg::Error::Other { errno }) if errno == ffmpeg::util::error::EAGAIN => {
                    return true;
                }
                Err(ffmpeg::Error::Eof) => {
                    return true;
                }
                Err(e) => {
                    eprintln!("[decode:audio] receive_frame: {e}");
                    return false;
                }
            }
        }
    }
}
