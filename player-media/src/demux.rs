// player-media/src/demux.rs
//
// C5: demuxer stage. Owns the input format context for the lifetime of the
// session and runs the loop from spec §4.5 on its own thread. Queues and
// session control are `Arc`-shared with the decode/presentation stages
// (spec §9's "borrowed references" rendered as shared ownership, since the
// stage genuinely runs on its own `'static` OS thread).

use std::sync::Arc;
use std::time::Duration;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::context::Input;

use crate::packet_frame::{AudioFrame, Packet, VideoFrame};
use crate::queue::Queue;
use crate::shared::{AudioPauseControl, SessionControl};

/// How long the demuxer's bounded wait parks for per spec §4.5 step 3.
const CONTINUE_READ_WAIT: Duration = Duration::from_micros(10);

pub struct DemuxerStage {
    pub input:        Input,
    pub audio_stream: Option<usize>,
    pub video_stream: Option<usize>,
    pub pkt_q_audio:  Arc<Queue<Packet>>,
    pub pkt_q_video:  Arc<Queue<Packet>>,
    /// Cleared alongside the packet queues on seek (spec §4.5 step 2): no
    /// frame decoded before the seek may linger and reach the presenter.
    pub frame_q_audio: Arc<Queue<AudioFrame>>,
    pub frame_q_video: Arc<Queue<VideoFrame>>,
    pub control:      Arc<SessionControl>,
    pub audio_sink:   Option<Arc<dyn AudioPauseControl>>,
}

impl DemuxerStage {
    pub fn run(mut self) {
        loop {
            if self.control.is_aborted() {
                return;
            }

            if let Some(target_secs) = self.control.take_seek() {
                self.handle_seek(target_secs);
                continue;
            }

            if self.control.is_paused() || self.queues_full() {
                self.control.wait_continue_read(CONTINUE_READ_WAIT);
                continue;
            }

            let mut packet = ffmpeg::Packet::empty();
            match packet.read(&mut self.input) {
                Ok(()) => {
                    let stream_index = packet.stream();
                    self.route(Packet::new(packet, stream_index));
                }
                Err(ffmpeg::Error::Eof) => {
                    self.control.set_eof(true);
                    // Park until a seek, close (abort), or resume clears EOF.
                    while self.control.is_eof()
                        && !self.control.is_aborted()
                        && !self.control.has_pending_seek()
                    {
                        self.control.wait_continue_read(CONTINUE_READ_WAIT);
                    }
                }
                Err(e) => {
                    eprintln!("[demux] transient read error: {e}");
                }
            }
        }
    }

    fn queues_full(&self) -> bool {
        self.pkt_q_audio.is_full() || self.pkt_q_video.is_full()
    }

    fn route(&self, pkt: Packet) {
        let is_audio = self.audio_stream == Some(pkt.stream_index);
        let is_video = self.video_stream == Some(pkt.stream_index);
        if is_audio {
            self.pkt_q_audio.push(pkt);
        } else if is_video {
            self.pkt_q_video.push(pkt);
        }
        // Any other stream index (e.g. subtitle, data) is dropped — out of
        // scope per spec §1.
    }

    fn handle_seek(&mut self, target_secs: f64) {
        if let Some(sink) = &self.audio_sink {
            sink.pause_callback();
        }

        // Whole-input seek (stream_index = -1 equivalent): the target must be
        // in the codec library's own microsecond scale, not the selected
        // stream's time_base (spec §9 "Unit conversions" (b)).
        let target_ts = player_core::helpers::time::seconds_to_av_ts(target_secs);

        if let Err(e) = self.input.seek(target_ts, ..target_ts) {
            eprintln!("[demux] seek failed: {e}");
        }

        self.pkt_q_audio.clear();
        self.pkt_q_video.clear();
        self.frame_q_audio.clear();
        self.frame_q_video.clear();
        self.control.set_eof(false);

        if let Some(sink) = &self.audio_sink {
            sink.resume_callback();
        }
    }
}
