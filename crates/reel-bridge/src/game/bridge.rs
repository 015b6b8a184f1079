use std::time::Duration;

use crate::api::types::{GameRewardEvent, GameResultEvent};
use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::game::banner::Banner;
use crate::protocol::message::OutboundMessage;
use crate::relay::host::{HostRelay, HostSink};
use crate::schedule::timer::{Scheduler, TaskId, TimerSet};

/// Handle returned by the game runtime once the build is up.
pub trait GameInstance {
    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), BridgeError>;

    fn quit(&mut self) -> Result<(), BridgeError>;
}

/// Channel into the game frame.
pub trait FrameSink {
    fn post(&mut self, payload: &str) -> Result<(), BridgeError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameState {
    Idle,
    Loading { progress: f32 },
    Running,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BannerId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GameTimer {
    SendReward,
    DismissBanner(BannerId),
}

/// What a due task turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameTimerOutcome {
    /// Not one of ours, or already cancelled.
    Ignored,
    RewardSent(GameRewardEvent),
    RewardFailed,
    DismissBanner(BannerId),
}

/// Drives one embedded game: reward in after load, result out on finish.
pub struct GameBridge {
    state: GameState,
    instance: Option<Box<dyn GameInstance>>,
    timers: TimerSet<GameTimer>,
    settle_delay: Duration,
    banner_dismiss: Duration,
    reward: GameRewardEvent,
    result_forwarded: bool,
    next_banner: u32,
}

impl GameBridge {
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            state: GameState::Idle,
            instance: None,
            timers: TimerSet::new(),
            settle_delay: config.reward_settle_delay(),
            banner_dismiss: config.banner_dismiss_delay(),
            reward: GameRewardEvent {
                points: config.reward_points,
            },
            result_forwarded: false,
            next_banner: 0,
        }
    }

    pub fn begin_loading(&mut self) {
        if self.state == GameState::Idle {
            self.state = GameState::Loading { progress: 0.0 };
        }
    }

    /// Record load progress. Returns the value clamped to `[0, 1]`.
    pub fn on_progress(&mut self, progress: f32) -> f32 {
        let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
        if let GameState::Loading { .. } = self.state {
            self.state = GameState::Loading { progress };
        }
        progress
    }

    /// The build finished loading. Schedules the reward post.
    pub fn on_instance_created(
        &mut self,
        instance: Box<dyn GameInstance>,
        scheduler: &mut dyn Scheduler,
    ) {
        if self.state == GameState::Quit || self.instance.is_some() {
            log::warn!("game: unexpected instance, quitting it");
            let mut instance = instance;
            if let Err(e) = instance.quit() {
                log::debug!("game: quit failed: {e}");
            }
            return;
        }
        self.instance = Some(instance);
        self.state = GameState::Running;
        log::info!(
            "game: loaded, sending {} points in {}ms",
            self.reward.points,
            self.settle_delay.as_millis()
        );
        self.timers
            .schedule(scheduler, self.settle_delay, GameTimer::SendReward);
    }

    pub fn on_load_failed(&mut self, error: &BridgeError) {
        log::error!("game: load failed: {error}");
        if self.state != GameState::Quit {
            self.state = GameState::Idle;
        }
    }

    /// A scheduled task came due.
    pub fn on_timer(&mut self, id: TaskId, frame: &mut dyn FrameSink) -> GameTimerOutcome {
        match self.timers.fire(id) {
            Some(GameTimer::SendReward) => self.send_reward(frame),
            Some(GameTimer::DismissBanner(banner)) => GameTimerOutcome::DismissBanner(banner),
            None => GameTimerOutcome::Ignored,
        }
    }

    fn send_reward(&mut self, frame: &mut dyn FrameSink) -> GameTimerOutcome {
        let posted = OutboundMessage::from(self.reward)
            .to_json()
            .and_then(|json| frame.post(&json));
        match posted {
            Ok(()) => {
                log::info!("game: sent {} points", self.reward.points);
                GameTimerOutcome::RewardSent(self.reward)
            }
            Err(e) => {
                log::error!("game: failed to send reward: {e}");
                GameTimerOutcome::RewardFailed
            }
        }
    }

    /// The frame reported a finished round. The first result of a session
    /// is forwarded to the host; repeats are dropped.
    pub fn on_result<S: HostSink>(
        &mut self,
        result: GameResultEvent,
        relay: &mut HostRelay<S>,
        on_result: impl FnOnce(GameResultEvent),
    ) -> bool {
        if self.state == GameState::Quit {
            return false;
        }
        if self.result_forwarded {
            log::debug!("game: repeated finish ignored");
            return false;
        }
        self.result_forwarded = true;
        log::info!("game: finished, correct = {}", result.is_correct);
        on_result(result);
        relay.send(&OutboundMessage::from(result));
        true
    }

    /// Register a runtime banner. Warnings get a dismiss task.
    pub fn on_banner(&mut self, banner: &Banner, scheduler: &mut dyn Scheduler) -> BannerId {
        self.next_banner += 1;
        let id = BannerId(self.next_banner);
        if let Some(after) = banner.auto_dismiss(self.banner_dismiss) {
            self.timers
                .schedule(scheduler, after, GameTimer::DismissBanner(id));
        }
        id
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        match self.instance.as_mut() {
            Some(instance) => {
                if let Err(e) = instance.set_fullscreen(fullscreen) {
                    log::warn!("game: fullscreen failed: {e}");
                }
            }
            None => log::debug!("game: fullscreen requested before load"),
        }
    }

    /// Cancel pending work and quit the game.
    pub fn teardown(&mut self, scheduler: &mut dyn Scheduler) {
        self.timers.cancel_all(scheduler);
        if let Some(mut instance) = self.instance.take() {
            if let Err(e) = instance.quit() {
                log::debug!("game: quit failed: {e}");
            }
        }
        self.state = GameState::Quit;
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn reward(&self) -> GameRewardEvent {
        self.reward
    }

    pub fn result_forwarded(&self) -> bool {
        self.result_forwarded
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::protocol::message::InboundMessage;
    use crate::protocol::origin::OriginPolicy;
    use crate::relay::host::RecordingSink;
    use crate::schedule::manual::ManualScheduler;
    use serde_json::json;

    #[derive(Debug, Default)]
    pub(crate) struct InstanceCalls {
        pub fullscreen: Vec<bool>,
        pub quits: u32,
    }

    pub(crate) struct FakeInstance(pub Rc<RefCell<InstanceCalls>>);

    impl FakeInstance {
        pub(crate) fn new() -> (Self, Rc<RefCell<InstanceCalls>>) {
            let calls = Rc::new(RefCell::new(InstanceCalls::default()));
            (FakeInstance(Rc::clone(&calls)), calls)
        }
    }

    impl GameInstance for FakeInstance {
        fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), BridgeError> {
            self.0.borrow_mut().fullscreen.push(fullscreen);
            Ok(())
        }

        fn quit(&mut self) -> Result<(), BridgeError> {
            self.0.borrow_mut().quits += 1;
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    pub(crate) struct RecordingFrame {
        pub posted: Vec<String>,
    }

    impl FrameSink for RecordingFrame {
        fn post(&mut self, payload: &str) -> Result<(), BridgeError> {
            self.posted.push(payload.to_string());
            Ok(())
        }
    }

    fn relay() -> HostRelay<RecordingSink> {
        let mut relay = HostRelay::new(
            RecordingSink::default(),
            OriginPolicy::new("https://app.example", Vec::new()),
        );
        relay.subscribe();
        relay
    }

    #[test]
    fn reward_sent_once_after_settle_delay() {
        let mut sched = ManualScheduler::new();
        let mut frame = RecordingFrame::default();
        let mut game = GameBridge::new(&BridgeConfig::default());
        game.begin_loading();
        let (instance, _) = FakeInstance::new();
        game.on_instance_created(Box::new(instance), &mut sched);
        assert_eq!(game.state(), GameState::Running);

        assert!(sched.advance(Duration::from_millis(1999)).is_empty());
        let due = sched.advance(Duration::from_millis(1));
        assert_eq!(due.len(), 1);
        assert_eq!(
            game.on_timer(due[0], &mut frame),
            GameTimerOutcome::RewardSent(GameRewardEvent { points: 100 })
        );
        assert_eq!(game.on_timer(due[0], &mut frame), GameTimerOutcome::Ignored);
        assert_eq!(frame.posted, vec![r#"{"type":"sendPointToUnity","point":100}"#]);
    }

    #[test]
    fn teardown_before_settle_sends_nothing() {
        let mut sched = ManualScheduler::new();
        let mut game = GameBridge::new(&BridgeConfig::default());
        let (instance, calls) = FakeInstance::new();
        game.on_instance_created(Box::new(instance), &mut sched);

        game.teardown(&mut sched);
        assert!(sched.advance(Duration::from_secs(10)).is_empty());
        assert_eq!(calls.borrow().quits, 1);
        assert_eq!(game.state(), GameState::Quit);
    }

    #[test]
    fn late_instance_is_quit() {
        let mut sched = ManualScheduler::new();
        let mut game = GameBridge::new(&BridgeConfig::default());
        game.begin_loading();
        game.teardown(&mut sched);

        let (instance, calls) = FakeInstance::new();
        game.on_instance_created(Box::new(instance), &mut sched);
        assert_eq!(calls.borrow().quits, 1);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn game_finish_forwards_one_result() {
        let mut relay = relay();
        let mut game = GameBridge::new(&BridgeConfig::default());
        let raw = json!({ "name": "GameFinish", "data": { "isCorrect": true } });

        let mut seen = Vec::new();
        for _ in 0..2 {
            if let InboundMessage::GameFinish(result) = relay.receive("", &raw) {
                game.on_result(result, &mut relay, |r| seen.push(r));
            }
        }

        assert_eq!(seen, vec![GameResultEvent { is_correct: true }]);
        assert_eq!(relay.sink().payloads(), vec![r#"{"type":"gameFinished","isCorrect":true}"#]);
    }

    #[test]
    fn game_finish_without_data_forwards_nothing() {
        let relay = relay();
        let raw = json!({ "name": "GameFinish" });
        assert_eq!(relay.receive("", &raw), InboundMessage::Unrecognized);
        assert_eq!(relay.sent_count(), 0);
    }

    #[test]
    fn progress_is_clamped() {
        let mut game = GameBridge::new(&BridgeConfig::default());
        game.begin_loading();
        assert_eq!(game.on_progress(0.5), 0.5);
        assert_eq!(game.state(), GameState::Loading { progress: 0.5 });
        assert_eq!(game.on_progress(1.7), 1.0);
        assert_eq!(game.on_progress(-0.2), 0.0);
        assert_eq!(game.on_progress(f32::NAN), 0.0);
    }

    #[test]
    fn warning_banners_are_dismissed() {
        let mut sched = ManualScheduler::new();
        let mut frame = RecordingFrame::default();
        let mut game = GameBridge::new(&BridgeConfig::default());

        let error = game.on_banner(&Banner::new("broken", "error"), &mut sched);
        let warning = game.on_banner(&Banner::new("slow", "warning"), &mut sched);
        assert_ne!(error, warning);
        assert_eq!(sched.pending(), 1);

        let due = sched.advance(Duration::from_millis(5000));
        assert_eq!(
            game.on_timer(due[0], &mut frame),
            GameTimerOutcome::DismissBanner(warning)
        );
        assert!(frame.posted.is_empty());
    }

    #[test]
    fn fullscreen_reaches_instance() {
        let mut sched = ManualScheduler::new();
        let mut game = GameBridge::new(&BridgeConfig::default());
        game.set_fullscreen(true);
        let (instance, calls) = FakeInstance::new();
        game.on_instance_created(Box::new(instance), &mut sched);
        game.set_fullscreen(true);
        assert_eq!(calls.borrow().fullscreen, vec![true]);
    }

    #[test]
    fn load_failure_returns_to_idle() {
        let mut game = GameBridge::new(&BridgeConfig::default());
        game.begin_loading();
        game.on_load_failed(&BridgeError::LoaderFailure {
            src: "/unity/Build/unity_game.loader.js".to_string(),
        });
        assert_eq!(game.state(), GameState::Idle);
    }
}
