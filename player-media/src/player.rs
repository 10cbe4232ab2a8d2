// player-media/src/player.rs
//
// C11: the player state machine. Owns the source contexts for the open
// session's lifetime, wires the queues/clocks/control shared by the decode
// and presentation stages, and drives the public operation table from spec
// §4.9. Generic over `P: VideoPresenter` so player-ui can hand in its egui
// texture canvas without player-media depending on egui (spec §9, "deep
// inheritance" design note: a concrete object parameterized by its backends,
// not a base-class hierarchy).

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use anyhow::{anyhow, Result};
use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::context::Input;
use ffmpeg::media::Type as MediaType;

use player_core::helpers::time::av_ts_to_seconds;
use player_core::{MediaSource, PlayerConfig, PlayerOp, PlayerState, Playlist};

use crate::audio_sink::AudioSink;
use crate::clock::MediaClock;
use crate::decode_audio::AudioDecodeStage;
use crate::decode_video::VideoDecodeStage;
use crate::demux::DemuxerStage;
use crate::filters::VideoScaler;
use crate::packet_frame::{AudioFrame, Packet, VideoFrame};
use crate::pixel_map::map_pixel_format;
use crate::presenter::{PresentedFrame, PresenterEvent, VideoPresenter};
use crate::queue::Queue;
use crate::recorder::Recorder;
use crate::shared::SessionControl;
use crate::sync::{pacemaker_delay, resolve_nominal_delay, sync_delay};

/// Per-queue capacity as a multiple of `seek_step x rate`, bounding buffered
/// media to roughly the seek window (spec §9, "Unit conversions" (c)).
const PACKET_QUEUE_BASE: usize = 256;
const FRAME_QUEUE_BASE: usize = 64;

/// Result of one `tick()` call, consumed by the embedding UI/driver loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing to do yet (paused, or the computed delay hasn't elapsed).
    Idle,
    /// A frame was decoded, scaled and handed to the presenter.
    Presented,
    /// Playback reached end of stream; state is now `Finished`.
    Finished,
    /// `play_next`/`play_prev` was requested; the embedder should call
    /// `advance_playlist` next.
    PlaylistAdvance,
}

struct OpenedSession {
    input: Input,
    audio_stream: Option<usize>,
    video_stream: Option<usize>,
    audio_decoder: Option<ffmpeg::decoder::Audio>,
    video_decoder: Option<ffmpeg::decoder::Video>,
    audio_time_base: f64,
    video_time_base: f64,
    duration_secs: f64,
    src_w: u32,
    src_h: u32,
    sample_rate: u32,
    channels: u16,
}

/// One open session's live thread handles and shared state, torn down by
/// `close()` in the exact order spec §5 requires: abort -> close queues ->
/// join threads -> free contexts.
struct RunningSession {
    control: Arc<SessionControl>,
    pkt_q_audio: Arc<Queue<Packet>>,
    pkt_q_video: Arc<Queue<Packet>>,
    frame_q_audio: Arc<Queue<AudioFrame>>,
    frame_q_video: Arc<Queue<VideoFrame>>,
    audio_sink: Option<Arc<AudioSink>>,
    threads: Vec<JoinHandle<()>>,
}

pub struct Player<P: VideoPresenter> {
    config: PlayerConfig,
    state: PlayerState,
    playlist: Playlist,
    presenter: P,

    session: Option<OpenedSession>,
    running: Option<RunningSession>,

    audio_clock: Arc<MediaClock>,
    video_clock: Arc<MediaClock>,
    display_scaler: VideoScaler,
    recorder: Option<Recorder>,

    url: String,
    duration_secs: f64,
    video_time_base: f64,
    display_w: u32,
    display_h: u32,

    prev_video_pts: i64,
    last_frame_duration_pts: i64,
    last_present_at: Option<Instant>,
    last_paused_time: Option<Instant>,
    /// Direction latched by `tick()` when it observes a playlist-advance
    /// request, so the embedder can read it back after `TickOutcome::
    /// PlaylistAdvance` without racing a second `take_playlist_direction`.
    pending_playlist_direction: i32,
}

impl<P: VideoPresenter> Player<P> {
    pub fn new(presenter: P) -> Self {
        Self {
            config: PlayerConfig::default(),
            state: PlayerState::None,
            playlist: Playlist::new(),
            presenter,
            session: None,
            running: None,
            audio_clock: Arc::new(MediaClock::new()),
            video_clock: Arc::new(MediaClock::new()),
            display_scaler: VideoScaler::new(),
            recorder: None,
            url: String::new(),
            duration_secs: 0.0,
            video_time_base: 0.0,
            display_w: 0,
            display_h: 0,
            prev_video_pts: 0,
            last_frame_duration_pts: 0,
            last_present_at: None,
            last_paused_time: None,
            pending_playlist_direction: 0,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn playlist_mut(&mut self) -> &mut Playlist {
        &mut self.playlist
    }

    /// Read-only access to the presenter, for embedders that need to pull
    /// state it exposes beyond the `VideoPresenter` trait (e.g. a texture
    /// handle to draw with) without the player itself knowing about it.
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn get_total_time(&self) -> f64 {
        self.duration_secs
    }

    /// Direction latched by the `tick()` call that returned
    /// `TickOutcome::PlaylistAdvance` — pass straight to `advance_playlist`.
    pub fn pending_playlist_direction(&self) -> i32 {
        self.pending_playlist_direction
    }

    pub fn get_current_time(&self) -> f64 {
        if self.audio_clock.is_valid() && self.config.common.enable_audio {
            self.audio_clock.get()
        } else {
            self.video_clock.get()
        }
    }

    // ---- §4.9 operation table -------------------------------------------

    /// Validates `cfg`, stores it and moves to READY. Valid from any state
    /// (spec §4.9): a re-`init` while a session is open first tears it down.
    pub fn init(&mut self, cfg: PlayerConfig) -> bool {
        if cfg.validate().is_err() {
            return false;
        }
        if self.state != PlayerState::None {
            self.close();
        }
        if let Some(save_file) = cfg.common.save_file.clone() {
            if cfg.common.save_while_playing {
                let rec = Recorder::new(save_file);
                rec.setup();
                self.recorder = Some(rec);
            }
        }
        self.config = cfg;
        self.state = PlayerState::Ready;
        true
    }

    /// Probes and opens `source`, selects streams, opens decoder contexts,
    /// and sizes the packet/frame queues from `seek_step` (spec §9 (c)). Does
    /// not start any threads — that happens in `play()`.
    pub fn open(&mut self, source: &MediaSource) -> bool {
        if !self.state.allows(PlayerOp::Open) {
            return false;
        }
        match open_session(source) {
            Ok(session) => {
                self.url = source.url.clone();
                self.duration_secs = session.duration_secs;
                self.video_time_base = session.video_time_base;
                self.session = Some(session);
                self.state = PlayerState::ReadyToPlay;
                true
            }
            Err(e) => {
                eprintln!("[player] open '{}' failed: {e}", source.url);
                false
            }
        }
    }

    /// Opens the queues, dispatches the demuxer and decode threads, unpauses
    /// the audio sink, and transitions to PLAYING. The display loop itself is
    /// driven by repeated `tick()` calls from the embedder, not blocked on
    /// here (spec §9 "native mode" design note: native mode only changes who
    /// drives `tick()`, never a global).
    pub fn play(&mut self) -> bool {
        if !self.state.allows(PlayerOp::Play) {
            return false;
        }
        let Some(session) = self.session.take() else { return false };

        let seek_window = self.config.common.seek_step.max(1.0);
        let pkt_cap = (PACKET_QUEUE_BASE as f64 * seek_window).round() as usize;
        let frame_cap = (FRAME_QUEUE_BASE as f64 * seek_window).round() as usize;

        let control = Arc::new(SessionControl::new());
        let pkt_q_audio: Arc<Queue<Packet>> = Arc::new(Queue::new(pkt_cap.max(8)));
        let pkt_q_video: Arc<Queue<Packet>> = Arc::new(Queue::new(pkt_cap.max(8)));
        let frame_q_audio: Arc<Queue<AudioFrame>> = Arc::new(Queue::new(frame_cap.max(4)));
        let frame_q_video: Arc<Queue<VideoFrame>> = Arc::new(Queue::new(frame_cap.max(4)));
        pkt_q_audio.open();
        pkt_q_video.open();
        frame_q_audio.open();
        frame_q_video.open();

        self.audio_clock.reset();
        self.video_clock.reset();
        self.prev_video_pts = 0;
        self.last_frame_duration_pts = 0;
        self.last_present_at = None;

        let OpenedSession {
            input,
            audio_stream,
            video_stream,
            audio_decoder,
            video_decoder,
            audio_time_base,
            sample_rate,
            channels,
            src_w,
            src_h,
            ..
        } = session;
        let (display_w, display_h) = player_core::helpers::geometry::compute_display_size(
            src_w as i32,
            src_h as i32,
            &self.config.video,
        );
        self.display_w = display_w;
        self.display_h = display_h;

        let mut threads = Vec::new();
        let mut audio_sink = None;

        if self.config.common.enable_audio {
            if let Some(decoder) = audio_decoder {
                let rate = if self.config.audio.sample_rate > 0 {
                    self.config.audio.sample_rate as u32
                } else {
                    sample_rate
                };
                match AudioSink::open(
                    rate,
                    channels.max(1),
                    audio_time_base,
                    Arc::clone(&frame_q_audio),
                    Arc::clone(&self.audio_clock),
                    self.config.audio.volume,
                    self.config.audio.is_muted,
                ) {
                    Ok(sink) => {
                        let _ = sink.play();
                        let ctl = Arc::clone(&control);
                        let stage = AudioDecodeStage {
                            decoder,
                            pkt_q: Arc::clone(&pkt_q_audio),
                            frame_q: Arc::clone(&frame_q_audio),
                            control: ctl,
                        };
                        threads.push(std::thread::spawn(move || stage.run()));
                        audio_sink = Some(Arc::new(sink));
                    }
                    Err(e) => eprintln!("[player] audio sink open failed: {e}"),
                }
            }
        }

        if self.config.common.enable_video {
            if let Some(decoder) = video_decoder {
                let ctl = Arc::clone(&control);
                let stage = VideoDecodeStage {
                    decoder,
                    pkt_q: Arc::clone(&pkt_q_video),
                    frame_q: Arc::clone(&frame_q_video),
                    control: ctl,
                };
                threads.push(std::thread::spawn(move || stage.run()));
            }
        }

        let demux_sink: Option<Arc<dyn crate::shared::AudioPauseControl>> = audio_sink
            .as_ref()
            .map(|sink| Arc::clone(sink) as Arc<dyn crate::shared::AudioPauseControl>);
        let demuxer = DemuxerStage {
            input,
            audio_stream,
            video_stream,
            pkt_q_audio: Arc::clone(&pkt_q_audio),
            pkt_q_video: Arc::clone(&pkt_q_video),
            frame_q_audio: Arc::clone(&frame_q_audio),
            frame_q_video: Arc::clone(&frame_q_video),
            control: Arc::clone(&control),
            audio_sink: demux_sink,
        };
        threads.push(std::thread::spawn(move || demuxer.run()));

        self.running = Some(RunningSession {
            control,
            pkt_q_audio,
            pkt_q_video,
            frame_q_audio,
            frame_q_video,
            audio_sink,
            threads,
        });
        self.state = PlayerState::Playing;
        true
    }

    /// Pauses the audio sink and records the wall-clock pause instant (spec
    /// §4.9). Valid from PLAYING or READY_TO_PLAY (pausing before the first
    /// `play()` call is used by a UI that opens paused).
    pub fn pause(&mut self) -> bool {
        if !self.state.allows(PlayerOp::Pause) {
            return false;
        }
        if let Some(running) = &self.running {
            running.control.set_paused(true);
            if let Some(sink) = &running.audio_sink {
                let _ = sink.pause();
            }
        }
        self.last_paused_time = Some(Instant::now());
        self.state = PlayerState::Paused;
        true
    }

    /// Resumes the audio sink. Valid only from PAUSED.
    pub fn replay(&mut self) -> bool {
        if !self.state.allows(PlayerOp::Replay) {
            return false;
        }
        if let Some(running) = &self.running {
            running.control.set_paused(false);
            if let Some(sink) = &running.audio_sink {
                let _ = sink.play();
            }
        }
        self.last_paused_time = None;
        self.state = PlayerState::Playing;
        true
    }

    /// Clamps `t` into `[0, total]` and flags the demuxer for a seek. The
    /// actual seek is performed by the demuxer thread (spec §4.5 step 2).
    pub fn seek(&mut self, t: f64) -> bool {
        if !self.state.can_seek() {
            return false;
        }
        let Some(running) = &self.running else { return false };
        let clamped = t.clamp(0.0, self.duration_secs.max(0.0));
        running.control.request_seek(clamped);
        true
    }

    /// Aborts, closes every queue, joins every thread, then frees the
    /// contexts and resets to READY (spec §5 ordering: abort -> close queues
    /// -> join threads -> free). Idempotent — a second call on an
    /// already-READY/NONE player is a harmless no-op, matching "close()
    /// always succeeds idempotently" (spec §6).
    pub fn close(&mut self) -> bool {
        if !self.state.can_close() {
            return self.state == PlayerState::None || self.state == PlayerState::Ready;
        }
        if let Some(running) = self.running.take() {
            running.control.abort();
            running.pkt_q_audio.close();
            running.pkt_q_video.close();
            running.frame_q_audio.close();
            running.frame_q_video.close();
            if let Some(sink) = &running.audio_sink {
                let _ = sink.pause();
            }
            for handle in running.threads {
                let _ = handle.join();
            }
        }
        if let Some(rec) = &self.recorder {
            rec.close();
        }
        self.session = None;
        self.presenter.destroy_texture();
        self.state = PlayerState::Ready;
        true
    }

    /// Requests a playlist advance (spec §4.9 `play_next`). Valid while
    /// PLAYING; the outer driver observes `TickOutcome::PlaylistAdvance` from
    /// the next `tick()` and calls `advance_playlist`.
    pub fn play_next(&mut self) -> bool {
        if self.state != PlayerState::Playing {
            return false;
        }
        if let Some(running) = &self.running {
            running.control.request_play_next();
        }
        true
    }

    pub fn play_prev(&mut self) -> bool {
        if self.state != PlayerState::Playing {
            return false;
        }
        if let Some(running) = &self.running {
            running.control.request_play_prev();
        }
        true
    }

    /// Closes the current session, advances the playlist by `direction` (+1
    /// next, -1 prev), and opens+plays the new current source. Honors
    /// `auto_read_next_media`: when false, the playlist position still moves
    /// but playback does not restart automatically.
    pub fn advance_playlist(&mut self, direction: i32) -> bool {
        self.pending_playlist_direction = 0;
        self.close();
        if direction < 0 {
            self.playlist.prev();
        } else {
            self.playlist.next();
        }
        let Some(source) = self.playlist.current().cloned() else {
            return false;
        };
        if !self.open(&source) {
            return false;
        }
        if self.config.common.auto_read_next_media {
            self.play()
        } else {
            true
        }
    }

    pub fn load_playlist(&mut self, playlist: Playlist) {
        self.playlist = playlist;
    }

    // ---- runtime-adjustable scalars ---------------------------------------

    pub fn set_volume(&mut self, v: f32) {
        self.config.audio.volume = v.clamp(0.0, 5.0);
        if let Some(running) = &self.running {
            if let Some(sink) = &running.audio_sink {
                sink.set_volume(self.config.audio.volume);
            }
        }
    }

    pub fn volume(&self) -> f32 {
        self.config.audio.volume
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.config.audio.is_muted = muted;
        if let Some(running) = &self.running {
            if let Some(sink) = &running.audio_sink {
                sink.set_muted(muted);
            }
        }
    }

    pub fn toggle_mute(&mut self) {
        let now = !self.config.audio.is_muted;
        self.set_muted(now);
    }

    pub fn is_muted(&self) -> bool {
        self.config.audio.is_muted
    }

    pub fn auto_read_next_media(&self) -> bool {
        self.config.common.auto_read_next_media
    }

    // ---- presenter-driven tick ---------------------------------------------

    /// Advances playback by up to one video frame, per spec §4.8/§4.10. Call
    /// once per UI frame (or in a spin loop for a native/CLI driver). Never
    /// blocks: if the computed delay since the last presented frame hasn't
    /// elapsed, returns `Idle` immediately instead of sleeping.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state != PlayerState::Playing {
            return TickOutcome::Idle;
        }

        for event in self.presenter.poll_events() {
            self.handle_event(event);
        }

        // Pull out owned Arc handles so the rest of this call doesn't hold a
        // borrow of `self.running` across the `&mut self` calls below.
        let (control, frame_q_video) = match &self.running {
            Some(running) => (Arc::clone(&running.control), Arc::clone(&running.frame_q_video)),
            None => return TickOutcome::Idle,
        };

        let direction = control.take_playlist_direction();
        if direction != 0 {
            self.pending_playlist_direction = direction;
            return TickOutcome::PlaylistAdvance;
        }

        if control.is_eof()
            && frame_q_video.is_empty()
            && (self.duration_secs - self.get_current_time()) < 0.3
        {
            self.state = PlayerState::Finished;
            return TickOutcome::Finished;
        }

        if control.is_paused() {
            return TickOutcome::Idle;
        }

        if let Some(delay) = self.pending_delay(&frame_q_video) {
            let elapsed = self
                .last_present_at
                .map(|t| t.elapsed().as_secs_f64())
                .unwrap_or(f64::INFINITY);
            if elapsed < delay {
                return TickOutcome::Idle;
            }
        }

        let Some(frame) = frame_q_video.pop() else {
            return TickOutcome::Idle;
        };
        self.present_frame(frame, &frame_q_video);
        TickOutcome::Presented
    }

    /// Resolves the next frame's nominal delay without popping it, so
    /// `tick()` can decide whether it's too early to present yet.
    fn pending_delay(&self, frame_q_video: &Queue<VideoFrame>) -> Option<f64> {
        let peek = frame_q_video.peek()?;
        let audio_enabled = self.config.common.enable_audio && self.audio_clock.is_valid();
        let nominal = resolve_nominal_delay(
            self.last_frame_duration_pts,
            self.video_time_base,
            frame_q_video.peek_latest().map(|f| f.pts),
            self.prev_video_pts,
            peek.duration,
        );
        let delay = if audio_enabled {
            sync_delay(nominal, self.video_clock.get(), self.audio_clock.get())
        } else {
            let elapsed = self
                .last_present_at
                .map(|t| t.elapsed().as_secs_f64())
                .unwrap_or(0.0);
            pacemaker_delay(
                self.config.video.frame_rate.as_f64().max(1.0),
                self.config.common.speed,
                elapsed,
            )
        };
        if self.config.common.track_mode {
            None
        } else {
            Some(delay)
        }
    }

    fn present_frame(&mut self, frame: VideoFrame, frame_q_video: &Queue<VideoFrame>) {
        self.last_frame_duration_pts = frame.pts - self.prev_video_pts;
        self.prev_video_pts = frame.pts;
        self.video_clock.set(frame.pts as f64 * self.video_time_base);
        self.last_present_at = Some(Instant::now());

        if self.config.common.track_mode {
            while let Some(latest) = frame_q_video.peek_latest() {
                let Some(oldest) = frame_q_video.peek() else { break };
                let span = (latest.pts - oldest.pts) as f64 * self.video_time_base;
                if span < 3.0 {
                    break;
                }
                frame_q_video.pop();
            }
        }

        let scaled = if frame.frame.format() == ffmpeg::format::Pixel::YUV420P
            && frame.frame.width() == self.display_w
            && frame.frame.height() == self.display_h
        {
            None
        } else {
            match self.display_scaler.init(
                frame.frame.width(),
                frame.frame.height(),
                frame.frame.format(),
                self.display_w,
                self.display_h,
                frame.frame.format(),
            ) {
                Ok(()) => self.display_scaler.run(&frame.frame).ok(),
                Err(e) => {
                    eprintln!("[player] scaler init failed: {e}");
                    None
                }
            }
        };
        let to_present = scaled.as_ref().unwrap_or(&frame.frame);

        let format = map_pixel_format(to_present.format());
        let is_yuv = matches!(
            to_present.format(),
            ffmpeg::format::Pixel::YUV420P | ffmpeg::format::Pixel::YUVJ420P
                | ffmpeg::format::Pixel::YUV422P | ffmpeg::format::Pixel::YUV444P
        );
        let (planes, strides): (Vec<&[u8]>, Vec<usize>) = if is_yuv {
            (
                vec![to_present.data(0), to_present.data(1), to_present.data(2)],
                vec![to_present.stride(0), to_present.stride(1), to_present.stride(2)],
            )
        } else {
            (vec![to_present.data(0)], vec![to_present.stride(0)])
        };

        self.presenter.ensure_texture(to_present.width(), to_present.height(), format);
        self.presenter.present(PresentedFrame {
            format,
            width: to_present.width(),
            height: to_present.height(),
            planes: &planes,
            strides: &strides,
        });

        if let Some(rec) = &self.recorder {
            rec.write(&frame.frame);
        }
    }

    fn handle_event(&mut self, event: PresenterEvent) {
        match event {
            PresenterEvent::QuitOrEsc => {
                self.close();
            }
            PresenterEvent::TogglePause => match self.state {
                PlayerState::Playing => {
                    self.pause();
                }
                PlayerState::Paused => {
                    self.replay();
                }
                _ => {}
            },
            PresenterEvent::SeekBack => {
                let step = self.config.common.seek_step;
                let t = self.get_current_time() - step;
                self.seek(t);
            }
            PresenterEvent::SeekForward => {
                let step = self.config.common.seek_step;
                let t = self.get_current_time() + step;
                self.seek(t);
            }
            PresenterEvent::PlayPrev => {
                self.play_prev();
            }
            PresenterEvent::PlayNext => {
                self.play_next();
            }
            PresenterEvent::VolumeUp => {
                let v = self.volume();
                self.set_volume((v + 0.1).min(1.0));
            }
            PresenterEvent::VolumeDown => {
                let v = self.volume();
                self.set_volume((v - 0.1).max(0.0));
            }
            PresenterEvent::ToggleMute => {
                self.toggle_mute();
            }
        }
    }
}

/// Opens `source`, selects the best audio/video streams, and opens their
/// decoder contexts (spec §4.9 `open()`). Mirrors the open/probe pattern the
/// rest of the pack uses (`format::input` + `streams().best(Type)` +
/// `codec::context::Context::from_parameters`).
fn open_session(source: &MediaSource) -> Result<OpenedSession> {
    let input = open_input(source)?;

    let video_stream = input.streams().best(MediaType::Video).map(|s| s.index());
    let audio_stream = input.streams().best(MediaType::Audio).map(|s| s.index());

    if video_stream.is_none() && audio_stream.is_none() {
        return Err(anyhow!("no audio or video stream found in '{}'", source.url));
    }

    let (video_decoder, video_time_base, src_w, src_h) = if let Some(idx) = video_stream {
        let stream = input.stream(idx).ok_or_else(|| anyhow!("missing video stream"))?;
        let tb = stream.time_base();
        let tb_secs = tb.numerator() as f64 / tb.denominator() as f64;
        let ctx = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
            .map_err(|e| anyhow!("video decoder context: {e}"))?;
        let decoder = ctx.decoder().video().map_err(|e| anyhow!("open video decoder: {e}"))?;
        let (w, h) = (decoder.width(), decoder.height());
        (Some(decoder), tb_secs, w, h)
    } else {
        (None, 0.0, 0, 0)
    };

    let (audio_decoder, audio_time_base, sample_rate, channels) = if let Some(idx) = audio_stream {
        let stream = input.stream(idx).ok_or_else(|| anyhow!("missing audio stream"))?;
        let tb = stream.time_base();
        let tb_secs = tb.numerator() as f64 / tb.denominator() as f64;
        let ctx = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
            .map_err(|e| anyhow!("audio decoder context: {e}"))?;
        let decoder = ctx.decoder().audio().map_err(|e| anyhow!("open audio decoder: {e}"))?;
        let rate = decoder.rate();
        let channels = decoder.channels();
        (Some(decoder), tb_secs, rate, channels)
    } else {
        (None, 0.0, 0, 0)
    };

    let duration_secs = {
        let raw = input.duration();
        if raw > 0 {
            av_ts_to_seconds(raw)
        } else {
            0.0
        }
    };

    Ok(OpenedSession {
        input,
        audio_stream,
        video_stream,
        audio_decoder,
        video_decoder,
        audio_time_base,
        video_time_base,
        duration_secs,
        src_w,
        src_h,
        sample_rate,
        channels,
    })
}

/// Opens a plain container by URL, or a device grabber when
/// `input_format_hint` is set, passing `device_options` through as an
/// `ffmpeg::Dictionary` (spec §3, §6).
fn open_input(source: &MediaSource) -> Result<Input> {
    if let Some(fmt_name) = source.input_format_hint.as_deref().filter(|s| !s.is_empty()) {
        let input_format = ffmpeg::format::input::find(fmt_name)
            .ok_or_else(|| anyhow!("unknown input format '{fmt_name}'"))?;
        let mut dict = ffmpeg::Dictionary::new();
        if let Some(opts) = &source.device_options {
            if opts.framerate > 0.0 {
                dict.set("framerate", &opts.framerate.to_string());
            }
            dict.set("draw_mouse", if opts.draw_mouse { "1" } else { "0" });
            if let Some((w, h)) = opts.video_size {
                dict.set("video_size", &format!("{w}x{h}"));
            }
        }
        ffmpeg::format::input_with(&source.url, input_format, dict)
            .map_err(|e| anyhow!("open device '{}': {e}", source.url))
    } else {
        ffmpeg::format::input(&source.url).map_err(|e| anyhow!("open '{}': {e}", source.url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use player_core::config::Rational;

    struct NullPresenter {
        events: Vec<PresenterEvent>,
    }

    impl VideoPresenter for NullPresenter {
        fn ensure_texture(&mut self, _w: u32, _h: u32, _fmt: crate::pixel_map::PresenterTextureFormat) {}
        fn present(&mut self, _frame: PresentedFrame<'_>) {}
        fn poll_events(&mut self) -> Vec<PresenterEvent> {
            std::mem::take(&mut self.events)
        }
        fn destroy_texture(&mut self) {}
    }

    #[test]
    fn init_rejects_invalid_config() {
        let mut player = Player::new(NullPresenter { events: vec![] });
        let mut cfg = PlayerConfig::default();
        cfg.audio.channels = 0;
        assert!(!player.init(cfg));
        assert_eq!(player.state(), PlayerState::None);
    }

    #[test]
    fn init_then_ready() {
        let mut player = Player::new(NullPresenter { events: vec![] });
        assert!(player.init(PlayerConfig::default()));
        assert_eq!(player.state(), PlayerState::Ready);
    }

    #[test]
    fn play_before_open_fails() {
        let mut player = Player::new(NullPresenter { events: vec![] });
        player.init(PlayerConfig::default());
        assert!(!player.play());
        assert_eq!(player.state(), PlayerState::Ready);
    }

    #[test]
    fn close_is_idempotent_from_ready() {
        let mut player = Player::new(NullPresenter { events: vec![] });
        player.init(PlayerConfig::default());
        assert!(player.close());
        assert_eq!(player.state(), PlayerState::Ready);
    }

    #[test]
    fn volume_clamps_into_range() {
        let mut player = Player::new(NullPresenter { events: vec![] });
        player.init(PlayerConfig::default());
        player.set_volume(9.0);
        assert_eq!(player.volume(), 5.0);
        player.set_volume(-1.0);
        assert_eq!(player.volume(), 0.0);
    }

    #[test]
    fn toggle_mute_flips_state() {
        let mut player = Player::new(NullPresenter { events: vec![] });
        player.init(PlayerConfig::default());
        assert!(!player.is_muted());
        player.toggle_mute();
        assert!(player.is_muted());
    }

    #[test]
    fn frame_rate_rational_feeds_pacemaker() {
        let r = Rational::new(30, 1);
        assert_eq!(r.as_f64(), 30.0);
    }
}
