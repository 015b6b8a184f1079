use std::time::Duration;

use crate::api::types::ViewId;
use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::player::handle::{PlayerHandle, PlayerState};
use crate::player::loader::{LibraryLoader, LoadState, ScriptSource};
use crate::player::options::PlayerOptions;
use crate::player::session::PlaybackSession;
use crate::protocol::message::OutboundMessage;
use crate::relay::host::{HostRelay, HostSink};
use crate::schedule::timer::{Scheduler, TaskId, TimerSet};
use crate::video::id::VideoId;

/// Lifecycle of one mounted player view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Unloaded,
    Loading,
    Ready,
    Playing,
    Finished,
}

/// What a start command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Played,
    /// The player was not accepting commands yet; one retry is pending.
    RetryScheduled,
    /// Playback was already started this session.
    AlreadyStarted,
    /// No player is attached (still loading, or torn down).
    NoPlayer,
    /// The play call failed. Logged; the bridge stays where it was.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaybackTimer {
    RetryPlay,
}

/// Drives one embedded player from mount to completion and reports the
/// completion to the host exactly once.
pub struct PlaybackBridge {
    view: ViewId,
    session: PlaybackSession,
    state: PlaybackState,
    handle: Option<Box<dyn PlayerHandle>>,
    timers: TimerSet<PlaybackTimer>,
    retry_delay: Duration,
    torn_down: bool,
}

impl PlaybackBridge {
    pub fn new(view: ViewId, video_id: VideoId, config: &BridgeConfig) -> Self {
        Self {
            view,
            session: PlaybackSession::new(video_id),
            state: PlaybackState::Unloaded,
            handle: None,
            timers: TimerSet::new(),
            retry_delay: config.play_retry_delay(),
            torn_down: false,
        }
    }

    /// Ask the shared loader for the player library.
    ///
    /// `Ready` means the caller should construct the player now with
    /// `player_options()`; `Pending` means wait for the loader.
    pub fn mount<S: ScriptSource>(&mut self, loader: &mut LibraryLoader<S>) -> LoadState {
        let load = loader.ensure_loaded(self.view);
        match load {
            LoadState::Pending => self.state = PlaybackState::Loading,
            LoadState::Failed => log::error!("player: library unavailable, staying unloaded"),
            LoadState::Ready | LoadState::Absent => {}
        }
        load
    }

    pub fn player_options(&self) -> PlayerOptions {
        PlayerOptions::new(self.session.video_id())
    }

    /// Bind the constructed player. Only one player per view.
    pub fn attach(&mut self, handle: Box<dyn PlayerHandle>) -> Result<(), BridgeError> {
        if self.torn_down {
            return Err(BridgeError::PlayerCall("view already torn down".to_string()));
        }
        if self.handle.is_some() {
            return Err(BridgeError::PlayerCall("player already attached".to_string()));
        }
        self.handle = Some(handle);
        self.state = PlaybackState::Ready;
        log::info!("player: attached ({})", self.session.video_id());
        Ok(())
    }

    pub fn on_player_ready(&self) {
        log::info!("player: ready ({})", self.session.video_id());
    }

    /// Start playback. At most one play call per session reaches the player.
    pub fn start(&mut self, scheduler: &mut dyn Scheduler) -> StartOutcome {
        if self.session.started() {
            log::debug!("player: start ignored, already started");
            return StartOutcome::AlreadyStarted;
        }
        if self.handle.is_none() {
            log::warn!("player: start requested before the player exists");
            return StartOutcome::NoPlayer;
        }
        self.session.mark_started();

        match self.play_now() {
            Ok(()) => StartOutcome::Played,
            Err(BridgeError::CapabilityNotReady) => {
                log::info!(
                    "player: not ready yet, retrying in {}ms",
                    self.retry_delay.as_millis()
                );
                self.timers
                    .schedule(scheduler, self.retry_delay, PlaybackTimer::RetryPlay);
                StartOutcome::RetryScheduled
            }
            Err(e) => {
                log::error!("player: play failed: {e}");
                StartOutcome::Failed
            }
        }
    }

    /// Issue the play call if the player accepts commands.
    fn play_now(&mut self) -> Result<(), BridgeError> {
        let handle = self
            .handle
            .as_mut()
            .ok_or_else(|| BridgeError::PlayerCall("no player attached".to_string()))?;
        if !handle.can_play() {
            return Err(BridgeError::CapabilityNotReady);
        }
        handle.play()?;
        self.state = PlaybackState::Playing;
        Ok(())
    }

    /// A scheduled task came due. Returns false if it was not ours.
    pub fn on_timer(&mut self, id: TaskId) -> bool {
        match self.timers.fire(id) {
            Some(PlaybackTimer::RetryPlay) => {
                self.retry_play();
                true
            }
            None => false,
        }
    }

    fn retry_play(&mut self) {
        match self.play_now() {
            Ok(()) => {}
            Err(BridgeError::CapabilityNotReady) => {
                log::warn!("player: still not ready after retry, giving up")
            }
            Err(e) => log::error!("player: retried play failed: {e}"),
        }
    }

    /// Feed a player state change. Returns true when this call completed the
    /// session, which happens at most once.
    pub fn on_state_change<S: HostSink>(
        &mut self,
        state: PlayerState,
        relay: &mut HostRelay<S>,
        on_finish: impl FnOnce(&PlaybackSession),
    ) -> bool {
        if self.handle.is_none() {
            return false;
        }
        match state {
            state if state.is_terminal() => {
                if !self.session.mark_finished() {
                    log::debug!("player: repeated end event ignored");
                    return false;
                }
                self.state = PlaybackState::Finished;
                log::info!("player: finished ({})", self.session.video_id());
                on_finish(&self.session);
                relay.send(&OutboundMessage::VideoCompleted);
                true
            }
            PlayerState::Playing => {
                if self.state == PlaybackState::Ready {
                    self.state = PlaybackState::Playing;
                }
                false
            }
            _ => false,
        }
    }

    /// Cancel pending work and stop the player. Later events are ignored.
    pub fn teardown(&mut self, scheduler: &mut dyn Scheduler) {
        self.timers.cancel_all(scheduler);
        if let Some(mut handle) = self.handle.take() {
            if let Err(e) = handle.stop() {
                log::debug!("player: stop on teardown failed: {e}");
            }
        }
        self.torn_down = true;
    }

    pub fn view(&self) -> ViewId {
        self.view
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Position in seconds, 0 without a player.
    pub fn position(&self) -> f64 {
        self.handle.as_ref().map_or(0.0, |h| h.position())
    }

    /// Duration in seconds, 0 without a player.
    pub fn duration(&self) -> f64 {
        self.handle.as_ref().map_or(0.0, |h| h.duration())
    }
}
