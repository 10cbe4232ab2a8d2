// player-core/src/player_state.rs
//
// The player's lifecycle states (spec §3, §4.9):
//   NONE -> READY -> READY_TO_PLAY -> PLAYING <-> PAUSED -> FINISHED
// with ABORT reachable from any state. Transitions themselves are driven
// exclusively by player-media::Player — this enum only names the states
// and the (from, op) -> valid predicate so both the state machine and its
// tests share one source of truth.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerState {
    None,
    Ready,
    ReadyToPlay,
    Playing,
    Paused,
    Finished,
    Abort,
}

/// The operations named in the §4.9 table. `seek` and `close` are valid from
/// more than one state and are checked with dedicated predicates below
/// rather than being enumerated here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerOp {
    Init,
    Open,
    Play,
    Pause,
    Replay,
    Close,
}

impl PlayerState {
    /// True if `op` is valid to invoke while in `self`, per the §4.9 table.
    /// `seek` is valid "any post-open" state and is checked separately by
    /// `can_seek`; `close` is valid from >= READY_TO_PLAY, checked by
    /// `can_close`.
    pub fn allows(self, op: PlayerOp) -> bool {
        use PlayerOp::*;
        use PlayerState::*;
        match op {
            Init   => true, // valid from any state
            Open   => matches!(self, Ready | ReadyToPlay),
            Play   => matches!(self, ReadyToPlay),
            Pause  => matches!(self, Playing | ReadyToPlay),
            Replay => matches!(self, Paused),
            Close  => self.can_close(),
        }
    }

    /// `seek(t)` is valid from any state reached after a successful `open()`.
    pub fn can_seek(self) -> bool {
        matches!(
            self,
            PlayerState::ReadyToPlay
                | PlayerState::Playing
                | PlayerState::Paused
                | PlayerState::Finished
        )
    }

    pub fn can_close(self) -> bool {
        !matches!(self, PlayerState::None | PlayerState::Ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PlayerOp::*;
    use PlayerState::*;

    #[test]
    fn play_only_from_ready_to_play() {
        assert!(ReadyToPlay.allows(Play));
        assert!(!Playing.allows(Play));
        assert!(!Paused.allows(Play));
        assert!(!Ready.allows(Play));
    }

    #[test]
    fn pause_from_playing_or_ready_to_play() {
        assert!(Playing.allows(Pause));
        assert!(ReadyToPlay.allows(Pause));
        assert!(!Paused.allows(Pause));
        assert!(!Finished.allows(Pause));
    }

    #[test]
    fn replay_only_from_paused() {
        assert!(Paused.allows(Replay));
        assert!(!Playing.allows(Replay));
    }

    #[test]
    fn seek_valid_after_open_only() {
        assert!(!None.can_seek());
        assert!(!Ready.can_seek());
        assert!(ReadyToPlay.can_seek());
        assert!(Playing.can_seek());
        assert!(Paused.can_seek());
        assert!(Finished.can_seek());
    }

    #[test]
    fn close_valid_from_ready_to_play_and_above() {
        assert!(!None.can_close());
        assert!(!Ready.can_close());
        assert!(ReadyToPlay.can_close());
        assert!(Playing.can_close());
        assert!(Paused.can_close());
        assert!(Finished.can_close());
        assert!(Abort.can_close());
    }
}
