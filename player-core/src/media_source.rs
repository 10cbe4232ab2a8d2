// player-core/src/media_source.rs
//
// A single playable source: local file, network stream, or capture device.

use serde::{Deserialize, Serialize};

use crate::config::GrabberOptions;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MediaSource {
    pub url: String,
    /// Selects a device grabber (e.g. "x11grab", "avfoundation") when
    /// non-empty; otherwise the container is probed from `url`.
    pub input_format_hint: Option<String>,
    /// Grabber knobs, only consulted when `input_format_hint` is set.
    pub device_options: Option<GrabberOptions>,
}

impl MediaSource {
    pub fn file(url: impl Into<String>) -> Self {
        Self { url: url.into(), input_format_hint: None, device_options: None }
    }

    pub fn device(
        url: impl Into<String>,
        format_hint: impl Into<String>,
        options: GrabberOptions,
    ) -> Self {
        Self {
            url: url.into(),
            input_format_hint: Some(format_hint.into()),
            device_options: Some(options),
        }
    }

    pub fn is_device(&self) -> bool {
        self.input_format_hint.as_deref().is_some_and(|s| !s.is_empty())
    }
}
