// player-core/src/error.rs
//
// Error taxonomy shared by every crate in the workspace (see spec §7 and the
// "Exceptions / control flow" design note). Kinds, not types: callers match
// on the variant to decide whether to retry, log-and-continue, or tear down.

use std::fmt;

/// Tagged failure returned by operations that must report *why* they failed,
/// as opposed to the simple `bool` used by the Player state-machine table.
#[derive(Debug)]
pub enum PlayerError {
    /// Rejected at `init()` — a config field is out of its documented range.
    /// No side effects occur before this is returned.
    InvalidConfig(String),
    /// A recoverable, expected condition: demuxer hiccup, queue closed under
    /// a racing close(), playlist lookup miss on skipTo.
    Transient(String),
    /// Unrecoverable for the current session — codec library error, I/O
    /// failure, alloc failure. Carries the underlying error for display.
    Fatal(anyhow::Error),
    /// A lookup (playlist skipTo, stream selection) found nothing.
    NotFound(String),
    /// Normal termination of a finite stream. Not an error condition by
    /// itself — kept in the taxonomy because callers branch on it exactly
    /// like the other variants.
    EndOfStream,
}

impl fmt::Display for PlayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            PlayerError::Transient(msg)     => write!(f, "transient: {msg}"),
            PlayerError::Fatal(e)           => write!(f, "fatal: {e}"),
            PlayerError::NotFound(msg)      => write!(f, "not found: {msg}"),
            PlayerError::EndOfStream        => write!(f, "end of stream"),
        }
    }
}

impl std::error::Error for PlayerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlayerError::Fatal(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for PlayerError {
    fn from(e: anyhow::Error) -> Self {
        PlayerError::Fatal(e)
    }
}

pub type PlayerResult<T> = Result<T, PlayerError>;
