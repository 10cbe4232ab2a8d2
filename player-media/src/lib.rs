// player-media/src/lib.rs
//
// The playback pipeline: bounded queues (C1), media clock (C2), audio ring
// buffer (C3), scaler/resampler filters (C4), demuxer stage (C5), audio/video
// decode stages (C6/C7), audio presentation (C8, cpal), video presentation +
// sync controller (C9/C10), the player state machine (C11), and the recorder
// sidecar (C13). Depends on player-core for the pure data types (config,
// state enum, playlist) and ffmpeg-the-third for the codec library seam.

pub mod audio_sink;
pub mod clock;
pub mod decode_audio;
pub mod decode_video;
pub mod demux;
pub mod filters;
pub mod packet_frame;
pub mod pixel_map;
pub mod player;
pub mod presenter;
pub mod queue;
pub mod recorder;
pub mod ring_buffer;
pub mod shared;
pub mod sync;

pub use player::{Player, TickOutcome};
pub use presenter::{PresentedFrame, PresenterEvent, VideoPresenter};
pub use queue::Queue;
