use reel_bridge::{BridgeConfig, BridgeError, BridgeHooks, GameResultEvent, PlaybackSession};

/// Points granted for a finished video.
const REWARD_POINTS: u32 = 100;

/// The app page the native shell loads.
///
/// Keeps a tally of what happened so the console log reads as a session
/// summary.
pub struct RewardHooks {
    videos_finished: u32,
    correct_answers: u32,
    rounds: u32,
}

impl RewardHooks {
    pub fn new() -> Self {
        Self {
            videos_finished: 0,
            correct_answers: 0,
            rounds: 0,
        }
    }
}

impl BridgeHooks for RewardHooks {
    fn config(&self) -> BridgeConfig {
        BridgeConfig {
            reward_points: REWARD_POINTS,
            ..BridgeConfig::default()
        }
    }

    fn on_video_finished(&mut self, session: &PlaybackSession) {
        self.videos_finished += 1;
        log::info!(
            "reward-video: finished {} ({} this session)",
            session.video_id(),
            self.videos_finished
        );
    }

    fn on_game_result(&mut self, result: GameResultEvent) {
        self.rounds += 1;
        if result.is_correct {
            self.correct_answers += 1;
        }
        log::info!(
            "reward-video: round {} {} ({}/{} correct)",
            self.rounds,
            if result.is_correct { "correct" } else { "wrong" },
            self.correct_answers,
            self.rounds
        );
    }

    fn on_load_failed(&mut self, error: &BridgeError) {
        log::error!("reward-video: {error}");
    }
}
