use crate::video::id::VideoId;

/// Per-mount playback bookkeeping. Both flags only ever go false -> true;
/// a remount creates a new session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSession {
    video_id: VideoId,
    started: bool,
    finished: bool,
}

impl PlaybackSession {
    pub fn new(video_id: VideoId) -> Self {
        Self {
            video_id,
            started: false,
            finished: false,
        }
    }

    /// Latch `started`. Returns true only on the first call.
    pub fn mark_started(&mut self) -> bool {
        !std::mem::replace(&mut self.started, true)
    }

    /// Latch `finished`. Returns true only on the first call.
    pub fn mark_finished(&mut self) -> bool {
        !std::mem::replace(&mut self.finished, true)
    }

    pub fn video_id(&self) -> &VideoId {
        &self.video_id
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_latch_once() {
        let mut session = PlaybackSession::new(VideoId::parse("dQw4w9WgXcQ").unwrap());
        assert!(!session.started() && !session.finished());

        assert!(session.mark_started());
        assert!(!session.mark_started());
        assert!(session.started());

        assert!(session.mark_finished());
        assert!(!session.mark_finished());
        assert!(session.finished());
    }
}
