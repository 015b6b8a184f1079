use crate::error::BridgeError;

/// Player states as reported by the IFrame API's `onStateChange`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
    Unknown(i32),
}

impl PlayerState {
    pub fn from_code(code: i32) -> Self {
        match code {
            -1 => PlayerState::Unstarted,
            0 => PlayerState::Ended,
            1 => PlayerState::Playing,
            2 => PlayerState::Paused,
            3 => PlayerState::Buffering,
            5 => PlayerState::Cued,
            other => PlayerState::Unknown(other),
        }
    }

    pub fn is_terminal(self) -> bool {
        self == PlayerState::Ended
    }
}

/// Control surface of one embedded player instance.
///
/// Owned by exactly one `PlaybackBridge`.
pub trait PlayerHandle {
    /// Whether `play` can be called yet. The IFrame API attaches its methods
    /// some time after construction.
    fn can_play(&self) -> bool;

    fn play(&mut self) -> Result<(), BridgeError>;

    fn pause(&mut self) -> Result<(), BridgeError>;

    fn stop(&mut self) -> Result<(), BridgeError>;

    fn seek(&mut self, seconds: f64, allow_seek_ahead: bool) -> Result<(), BridgeError>;

    fn state(&self) -> PlayerState;

    /// Playback position in seconds.
    fn position(&self) -> f64;

    /// Video length in seconds, 0 while unknown.
    fn duration(&self) -> f64;
}
