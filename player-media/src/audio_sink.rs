// player-media/src/audio_sink.rs
//
// C8: audio presentation. A cpal output stream pulls PCM through a callback
// (spec §4.7); the callback resamples one audio frame at a time into the
// ring buffer, mixes/copies into the device buffer per the volume law, and
// leaves `audio_clock` back-corrected for the bytes still in flight.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};

use crate::clock::MediaClock;
use crate::filters::AudioResampler;
use crate::packet_frame::AudioFrame;
use crate::queue::Queue;
use crate::ring_buffer::RingBuffer;
use crate::shared::AudioPauseControl;

/// Sentinel matching the C source's `100/MAX` volume-is-unattenuated check
/// (spec §4.7 step 3): volume >= 1.0 bypasses the mix law entirely.
const UNATTENUATED_VOLUME: f32 = 1.0;

/// Minimum requested device buffer, in frames (SPEC_FULL.md §2, carried over
/// from the original `SDL_AUDIO_MIN_BUFFER_SIZE`).
pub const MIN_BUFFER_FRAMES: u32 = 512;
/// Caps how often the callback fires per second, bounding the requested
/// buffer from below (SPEC_FULL.md §2, `SDL_AUDIO_MAX_CALLBACKS_PER_SEC`).
pub const MAX_CALLBACKS_PER_SEC: u32 = 30;

/// `FFMAX(MIN_BUFFER_FRAMES, next_pow2(sample_rate / MAX_CALLBACKS_PER_SEC))`,
/// mirroring the original's `wanted.samples` computation so the device isn't
/// opened with a buffer so small it starves the callback thread.
fn wanted_buffer_frames(sample_rate: u32) -> u32 {
    let per_callback = sample_rate / MAX_CALLBACKS_PER_SEC.max(1);
    let next_pow2 = per_callback.max(1).next_power_of_two();
    MIN_BUFFER_FRAMES.max(next_pow2)
}

struct SinkShared {
    ring:        Mutex<RingBuffer>,
    resampler:   Mutex<AudioResampler>,
    frame_q:     Arc<Queue<AudioFrame>>,
    clock:       Arc<MediaClock>,
    volume_bits: AtomicU32,
    muted:       AtomicBool,
    paused:      AtomicBool,
    sample_rate: u32,
    channels:    u16,
    bytes_per_sec: u32,
    /// The audio stream's own rational time base (seconds per tick of
    /// `frame.pts`), typically `1/sample_rate` — not the codec library's
    /// microsecond `AV_TIME_BASE` (spec §4.7 step 2).
    audio_time_base: f64,
}

impl SinkShared {
    fn volume(&self) -> f32 {
        f32::from_bits(self.volume_bits.load(Ordering::Relaxed))
    }

    fn set_volume(&self, v: f32) {
        self.volume_bits.store(v.clamp(0.0, 5.0).to_bits(), Ordering::Relaxed);
    }
}

pub struct AudioSink {
    stream: cpal::Stream,
    shared: Arc<SinkShared>,
}

impl AudioSink {
    /// Opens the default output device at `sample_rate`/`channels`, wiring
    /// the callback to `frame_q` and `clock`. `frame_q`/`clock` are shared
    /// with the rest of the session via `Arc`.
    pub fn open(
        sample_rate: u32,
        channels: u16,
        audio_time_base: f64,
        frame_q: Arc<Queue<AudioFrame>>,
        clock: Arc<MediaClock>,
        initial_volume: f32,
        initial_muted: bool,
    ) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("no default audio output device"))?;

        let config = StreamConfig {
            channels,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Fixed(wanted_buffer_frames(sample_rate)),
        };

        let bytes_per_sec = sample_rate * channels as u32 * std::mem::size_of::<i16>() as u32;

        // Ring buffer sized for ~0.5s of audio at this rate, matching the
        // queue-capacity-from-seek-window rule in spec §9.
        let ring_capacity = (bytes_per_sec as f64 * 0.5) as usize;

        let shared = Arc::new(SinkShared {
            ring: Mutex::new(RingBuffer::new(ring_capacity)),
            resampler: Mutex::new(AudioResampler::new()),
            frame_q,
            clock,
            volume_bits: AtomicU32::new(initial_volume.to_bits()),
            muted: AtomicBool::new(initial_muted),
            paused: AtomicBool::new(false),
            sample_rate,
            channels,
            bytes_per_sec,
            audio_time_base,
        });

        let cb_shared = Arc::clone(&shared);
        let stream = device.build_output_stream(
            &config,
            move |data: &mut [i16], _info: &cpal::OutputCallbackInfo| {
                audio_callback(&cb_shared, data);
            },
            move |err| eprintln!("[audio_sink] stream error: {err}"),
            None,
        )?;

        Ok(Self { stream, shared })
    }

    pub fn play(&self) -> Result<()> {
        self.shared.paused.store(false, Ordering::SeqCst);
        self.stream.play().map_err(|e| anyhow!("cpal play: {e}"))
    }

    pub fn pause(&self) -> Result<()> {
        self.shared.paused.store(true, Ordering::SeqCst);
        self.stream.pause().map_err(|e| anyhow!("cpal pause: {e}"))
    }

    pub fn set_volume(&self, v: f32) {
        self.shared.set_volume(v);
    }

    pub fn set_muted(&self, muted: bool) {
        self.shared.muted.store(muted, Ordering::SeqCst);
    }

    pub fn is_muted(&self) -> bool {
        self.shared.muted.load(Ordering::SeqCst)
    }

    pub fn volume(&self) -> f32 {
        self.shared.volume()
    }
}

impl AudioPauseControl for AudioSink {
    fn pause_callback(&self) {
        let _ = self.pause();
    }

    fn resume_callback(&self) {
        let _ = self.play();
    }
}

/// One pull of `data.len()` i16 samples (spec §4.7). Runs on cpal's own
/// callback thread; never blocks on the frame queue (a non-blocking `pop`).
fn audio_callback(shared: &Arc<SinkShared>, data: &mut [i16]) {
    if shared.paused.load(Ordering::SeqCst) {
        data.fill(0);
        return;
    }

    let want_bytes = data.len() * std::mem::size_of::<i16>();
    let mut filled_bytes = 0usize;
    let mut silent = false;

    {
        let mut ring = shared.ring.lock().unwrap();
        while filled_bytes < want_bytes {
            if ring.readable() == 0 {
                match shared.frame_q.pop() {
                    Some(frame) => {
                        let mut resampler = shared.resampler.lock().unwrap();
                        if let Err(e) = ensure_resampler_ready(&mut resampler, &frame, shared) {
                            eprintln!("[audio_sink] resampler init: {e}");
                            silent = true;
                            break;
                        }
                        match resampler.run(&frame.frame) {
                            Ok(pcm) => {
                                ring.fill(pcm);
                                let nb_samples = frame.frame.samples() as f64;
                                let pts_secs = frame.pts as f64 * shared.audio_time_base;
                                shared.clock.set(pts_secs + nb_samples / shared.sample_rate as f64);
                            }
                            Err(e) => {
                                eprintln!("[audio_sink] resample: {e}");
                                silent = true;
                                break;
                            }
                        }
                    }
                    None => {
                        silent = true;
                        break;
                    }
                }
            }

            let want_now = (want_bytes - filled_bytes).min(ring.readable());
            if want_now == 0 {
                break;
            }
            let start = filled_bytes / std::mem::size_of::<i16>();
            let chunk = &mut data[start..start + want_now / std::mem::size_of::<i16>()];
            let mut raw = vec![0u8; want_now];
            ring.extract(Some(&mut raw), want_now);
            apply_volume(shared, &raw, chunk);
            filled_bytes += want_now;
        }
    }

    if filled_bytes < want_bytes {
        let start = filled_bytes / std::mem::size_of::<i16>();
        data[start..].fill(0);
    }

    if !silent {
        back_correct_clock(shared);
    }
}

fn ensure_resampler_ready(
    resampler: &mut AudioResampler,
    frame: &AudioFrame,
    shared: &SinkShared,
) -> Result<()> {
    use ffmpeg_the_third::util::channel_layout::ChannelLayout;
    use ffmpeg_the_third::util::format::sample::{Sample, Type};

    let out_layout = if shared.channels == 1 {
        ChannelLayout::MONO
    } else {
        ChannelLayout::STEREO
    };
    resampler.init(
        frame.frame.rate(),
        frame.frame.format(),
        frame.frame.channel_layout(),
        shared.sample_rate,
        Sample::I16(Type::Packed),
        out_layout,
    )
}

/// Volume/mute law from spec §4.7 step 3: unattenuated memcpy at/above
/// `UNATTENUATED_VOLUME`; otherwise zero + mix at the configured volume
/// (silence entirely when muted).
fn apply_volume(shared: &SinkShared, raw: &[u8], out: &mut [i16]) {
    let volume = shared.volume();
    let muted = shared.muted.load(Ordering::SeqCst);

    if muted {
        out.fill(0);
        return;
    }

    if volume >= UNATTENUATED_VOLUME {
        for (o, chunk) in out.iter_mut().zip(raw.chunks_exact(2)) {
            *o = i16::from_ne_bytes([chunk[0], chunk[1]]);
        }
        return;
    }

    for (o, chunk) in out.iter_mut().zip(raw.chunks_exact(2)) {
        let sample = i16::from_ne_bytes([chunk[0], chunk[1]]) as f32;
        *o = (sample * volume) as i16;
    }
}

/// Back-corrects `audio_clock` by the bytes still "in flight": one device
/// buffer plus whatever remains unread in the ring. The factor of two
/// (spec §9) accounts for a device buffer already queued for output plus
/// the one about to be queued.
fn back_correct_clock(shared: &SinkShared) {
    let readable = shared.ring.lock().unwrap().readable();
    let device_buf_estimate = (shared.bytes_per_sec as f64 * 0.02) as usize; // ~20ms
    let in_flight_bytes = 2 * device_buf_estimate + readable;
    let correction = in_flight_bytes as f64 / shared.bytes_per_sec as f64;
    let corrected = shared.clock.get() - correction;
    shared.clock.set(corrected);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wanted_buffer_frames_floors_at_minimum() {
        // 8000 / 30 = 266 -> next pow2 512, already at the minimum.
        assert_eq!(wanted_buffer_frames(8_000), 512);
    }

    #[test]
    fn wanted_buffer_frames_grows_with_sample_rate() {
        // 48000 / 30 = 1600 -> next pow2 2048.
        assert_eq!(wanted_buffer_frames(48_000), 2048);
    }

    #[test]
    fn volume_bits_round_trip() {
        let shared = SinkShared {
            ring: Mutex::new(RingBuffer::new(16)),
            resampler: Mutex::new(AudioResampler::new()),
            frame_q: Arc::new(Queue::new(4)),
            clock: Arc::new(MediaClock::new()),
            volume_bits: AtomicU32::new(1.0f32.to_bits()),
            muted: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            sample_rate: 48_000,
            channels: 2,
            bytes_per_sec: 48_000 * 2 * 2,
            audio_time_base: 1.0 / 48_000.0,
        };
        assert_eq!(shared.volume(), 1.0);
        shared.set_volume(0.3);
        assert!((shared.volume() - 0.3).abs() < 1e-6);
        shared.set_volume(9.0); // clamps
        assert_eq!(shared.volume(), 5.0);
    }

    #[test]
    fn apply_volume_muted_is_silent() {
        let shared = SinkShared {
            ring: Mutex::new(RingBuffer::new(16)),
            resampler: Mutex::new(AudioResampler::new()),
            frame_q: Arc::new(Queue::new(4)),
            clock: Arc::new(MediaClock::new()),
            volume_bits: AtomicU32::new(1.0f32.to_bits()),
            muted: AtomicBool::new(true),
            paused: AtomicBool::new(false),
            sample_rate: 48_000,
            channels: 2,
            bytes_per_sec: 48_000 * 2 * 2,
            audio_time_base: 1.0 / 48_000.0,
        };
        let raw = 1234i16.to_ne_bytes();
        let mut out = [999i16; 1];
        apply_volume(&shared, &raw, &mut out);
        assert_eq!(out, [0]);
    }

    #[test]
    fn apply_volume_unattenuated_is_memcpy() {
        let shared = SinkShared {
            ring: Mutex::new(RingBuffer::new(16)),
            resampler: Mutex::new(AudioResampler::new()),
            frame_q: Arc::new(Queue::new(4)),
            clock: Arc::new(MediaClock::new()),
            volume_bits: AtomicU32::new(1.0f32.to_bits()),
            muted: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            sample_rate: 48_000,
            channels: 2,
            bytes_per_sec: 48_000 * 2 * 2,
            audio_time_base: 1.0 / 48_000.0,
        };
        let raw = 1234i16.to_ne_bytes();
        let mut out = [0i16; 1];
        apply_volume(&shared, &raw, &mut out);
        assert_eq!(out, [1234]);
    }

    #[test]
    fn apply_volume_scales_linearly_below_unity() {
        let shared = SinkShared {
            ring: Mutex::new(RingBuffer::new(16)),
            resampler: Mutex::new(AudioResampler::new()),
            frame_q: Arc::new(Queue::new(4)),
            clock: Arc::new(MediaClock::new()),
            volume_bits: AtomicU32::new(0.5f32.to_bits()),
            muted: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            sample_rate: 48_000,
            channels: 2,
            bytes_per_sec: 48_000 * 2 * 2,
            audio_time_base: 1.0 / 48_000.0,
        };
        let raw = 1000i16.to_ne_bytes();
        let mut out = [0i16; 1];
        apply_volume(&shared, &raw, &mut out);
        assert_eq!(out, [500]);
    }
}
