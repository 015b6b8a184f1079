use crate::api::types::GameResultEvent;
use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::player::session::PlaybackSession;

/// Callbacks a page supplies to the bridges.
///
/// Only `config` is consulted up front; the rest are notifications and
/// default to doing nothing. The host is notified independently of these.
pub trait BridgeHooks {
    /// Return bridge configuration. Called once when the runner is built.
    fn config(&self) -> BridgeConfig {
        BridgeConfig::default()
    }

    /// The video played to its end. Called at most once per session.
    fn on_video_finished(&mut self, _session: &PlaybackSession) {}

    /// The game reported its result. Called at most once per game mount.
    fn on_game_result(&mut self, _result: GameResultEvent) {}

    /// A player or game script could not be loaded.
    fn on_load_failed(&mut self, _error: &BridgeError) {}
}

/// Hooks that only rely on the defaults.
#[derive(Debug, Default)]
pub struct DefaultHooks;

impl BridgeHooks for DefaultHooks {}
