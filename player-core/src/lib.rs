// player-core/src/lib.rs
//
// Pure project/config data shared between player-media and player-ui.
// No ffmpeg, no egui, no threads — serializable via serde where useful.

pub mod config;
pub mod error;
pub mod helpers;
pub mod media_source;
pub mod player_state;
pub mod playlist;

pub use config::PlayerConfig;
pub use error::{PlayerError, PlayerResult};
pub use media_source::MediaSource;
pub use player_state::{PlayerOp, PlayerState};
pub use playlist::Playlist;
