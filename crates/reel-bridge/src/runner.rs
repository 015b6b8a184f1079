use crate::api::hooks::BridgeHooks;
use crate::api::types::{GameRewardEvent, ViewId};
use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::game::banner::Banner;
use crate::game::bridge::{BannerId, FrameSink, GameBridge, GameInstance, GameTimerOutcome};
use crate::game::build::UnityBuild;
use crate::player::bridge::{PlaybackBridge, StartOutcome};
use crate::player::handle::{PlayerHandle, PlayerState};
use crate::player::loader::{LibraryLoader, LoadState, ScriptSource};
use crate::player::options::PlayerOptions;
use crate::protocol::message::{InboundMessage, RawMessage};
use crate::relay::host::{HostRelay, HostSink};
use crate::schedule::timer::{Scheduler, TaskId};
use crate::video::id::VideoId;

/// What the page should do after mounting a video view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoMount {
    /// The library is loaded: construct the player now.
    Construct(PlayerOptions),
    /// The loader script is in flight; `on_library_ready` will hand out the
    /// options.
    AwaitLibrary,
    /// The library failed to load earlier in this session.
    Unavailable,
}

/// A due task, resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOutcome {
    Ignored,
    PlayRetried,
    RewardSent(GameRewardEvent),
    RewardFailed,
    DismissBanner(BannerId),
}

/// Owns the host relay, the shared loader and at most one video view and
/// one game view, and routes every platform callback to the right bridge.
///
/// The browser layer keeps one of these per page; nothing in here touches
/// the DOM.
pub struct BridgeRunner<S: HostSink, L: ScriptSource> {
    hooks: Box<dyn BridgeHooks>,
    config: BridgeConfig,
    relay: HostRelay<S>,
    loader: LibraryLoader<L>,
    scheduler: Box<dyn Scheduler>,
    frame: Box<dyn FrameSink>,
    video: Option<PlaybackBridge>,
    game: Option<GameBridge>,
    next_view: u32,
}

impl<S: HostSink, L: ScriptSource> BridgeRunner<S, L> {
    pub fn new(
        hooks: Box<dyn BridgeHooks>,
        sink: S,
        script: L,
        scheduler: Box<dyn Scheduler>,
        frame: Box<dyn FrameSink>,
        own_origin: &str,
    ) -> Self {
        let config = hooks.config();
        Self::with_config(hooks, config, sink, script, scheduler, frame, own_origin)
    }

    /// Like `new`, but with an explicit config instead of `hooks.config()`.
    pub fn with_config(
        hooks: Box<dyn BridgeHooks>,
        config: BridgeConfig,
        sink: S,
        script: L,
        scheduler: Box<dyn Scheduler>,
        frame: Box<dyn FrameSink>,
        own_origin: &str,
    ) -> Self {
        let relay = HostRelay::new(sink, config.origin_policy(own_origin));
        let loader = LibraryLoader::new(script, config.player_loader_url.clone());
        Self {
            hooks,
            config,
            relay,
            loader,
            scheduler,
            frame,
            video: None,
            game: None,
            next_view: 0,
        }
    }

    // ---- Video ----

    /// Mount a video view for `url`, replacing any previous one.
    pub fn mount_video(&mut self, url: &str) -> Result<VideoMount, BridgeError> {
        self.unmount_video();
        let video_id = VideoId::parse(url).map_err(|e| {
            log::warn!("runner: {e}");
            e
        })?;

        self.next_view += 1;
        let mut bridge = PlaybackBridge::new(ViewId(self.next_view), video_id, &self.config);
        let mount = match bridge.mount(&mut self.loader) {
            LoadState::Ready => VideoMount::Construct(bridge.player_options()),
            LoadState::Pending => VideoMount::AwaitLibrary,
            LoadState::Failed | LoadState::Absent => {
                let err = BridgeError::LoaderFailure {
                    src: self.loader.src().to_string(),
                };
                self.hooks.on_load_failed(&err);
                VideoMount::Unavailable
            }
        };
        self.video = Some(bridge);
        self.relay.subscribe();
        Ok(mount)
    }

    /// The library signalled readiness. Returns options if the mounted video
    /// view was waiting for it.
    pub fn on_library_ready(&mut self) -> Option<PlayerOptions> {
        let released = self.loader.mark_ready();
        let video = self.video.as_ref()?;
        released
            .contains(&video.view())
            .then(|| video.player_options())
    }

    /// The loader script failed. Returns the error for the page to surface.
    pub fn on_library_failed(&mut self) -> BridgeError {
        self.loader.mark_failed();
        let err = BridgeError::LoaderFailure {
            src: self.loader.src().to_string(),
        };
        log::error!("runner: {err}");
        self.hooks.on_load_failed(&err);
        err
    }

    pub fn attach_player(&mut self, handle: Box<dyn PlayerHandle>) -> Result<(), BridgeError> {
        match self.video.as_mut() {
            Some(video) => video.attach(handle),
            None => Err(BridgeError::PlayerCall("no video view mounted".to_string())),
        }
    }

    pub fn on_player_ready(&self) {
        if let Some(video) = self.video.as_ref() {
            video.on_player_ready();
        }
    }

    /// Feed a raw `onStateChange` code. Returns true if the video completed.
    pub fn on_player_state(&mut self, code: i32) -> bool {
        let Some(video) = self.video.as_mut() else {
            return false;
        };
        let hooks = &mut self.hooks;
        video.on_state_change(PlayerState::from_code(code), &mut self.relay, |session| {
            hooks.on_video_finished(session)
        })
    }

    /// User-initiated start (tap on the page).
    pub fn start_playback(&mut self) -> StartOutcome {
        match self.video.as_mut() {
            Some(video) => video.start(self.scheduler.as_mut()),
            None => StartOutcome::NoPlayer,
        }
    }

    pub fn unmount_video(&mut self) {
        if let Some(mut video) = self.video.take() {
            video.teardown(self.scheduler.as_mut());
            self.loader.forget(video.view());
            log::info!("runner: video view unmounted");
        }
        self.refresh_subscription();
    }

    // ---- Game ----

    /// Mount a game view, replacing any previous one. Returns the build the
    /// page should load.
    pub fn mount_game(&mut self) -> &UnityBuild {
        self.unmount_game();
        let mut game = GameBridge::new(&self.config);
        game.begin_loading();
        self.game = Some(game);
        self.relay.subscribe();
        &self.config.unity
    }

    pub fn on_game_progress(&mut self, progress: f32) -> f32 {
        match self.game.as_mut() {
            Some(game) => game.on_progress(progress),
            None => progress.clamp(0.0, 1.0),
        }
    }

    pub fn on_game_created(&mut self, instance: Box<dyn GameInstance>) {
        match self.game.as_mut() {
            Some(game) => game.on_instance_created(instance, self.scheduler.as_mut()),
            None => {
                log::warn!("runner: game instance arrived with no game view, quitting it");
                let mut instance = instance;
                if let Err(e) = instance.quit() {
                    log::debug!("runner: quit failed: {e}");
                }
            }
        }
    }

    pub fn on_game_failed(&mut self, error: BridgeError) {
        if let Some(game) = self.game.as_mut() {
            game.on_load_failed(&error);
        }
        self.hooks.on_load_failed(&error);
    }

    /// Register a runtime banner. Returns the id the page should tag the
    /// banner element with.
    pub fn on_game_banner(&mut self, banner: &Banner) -> Option<BannerId> {
        let game = self.game.as_mut()?;
        Some(game.on_banner(banner, self.scheduler.as_mut()))
    }

    pub fn set_game_fullscreen(&mut self, fullscreen: bool) {
        if let Some(game) = self.game.as_mut() {
            game.set_fullscreen(fullscreen);
        }
    }

    pub fn unmount_game(&mut self) {
        if let Some(mut game) = self.game.take() {
            game.teardown(self.scheduler.as_mut());
            log::info!("runner: game view unmounted");
        }
        self.refresh_subscription();
    }

    // ---- Shared ----

    /// Route an inbound cross-context message.
    pub fn on_message(&mut self, origin: &str, raw: &RawMessage) -> InboundMessage {
        let message = self.relay.receive(origin, raw);
        match message {
            InboundMessage::StartPlayback => {
                let outcome = self.start_playback();
                log::info!("runner: host start -> {outcome:?}");
            }
            InboundMessage::GameFinish(result) => {
                if let Some(game) = self.game.as_mut() {
                    let hooks = &mut self.hooks;
                    game.on_result(result, &mut self.relay, |r| hooks.on_game_result(r));
                }
            }
            InboundMessage::Unrecognized => {}
        }
        message
    }

    /// A scheduled task came due.
    pub fn on_timer(&mut self, id: TaskId) -> TimerOutcome {
        self.scheduler.fired(id);
        if let Some(video) = self.video.as_mut() {
            if video.on_timer(id) {
                return TimerOutcome::PlayRetried;
            }
        }
        let Some(game) = self.game.as_mut() else {
            return TimerOutcome::Ignored;
        };
        match game.on_timer(id, self.frame.as_mut()) {
            GameTimerOutcome::Ignored => TimerOutcome::Ignored,
            GameTimerOutcome::RewardSent(reward) => TimerOutcome::RewardSent(reward),
            GameTimerOutcome::RewardFailed => TimerOutcome::RewardFailed,
            GameTimerOutcome::DismissBanner(id) => TimerOutcome::DismissBanner(id),
        }
    }

    /// Tear down both views.
    pub fn shutdown(&mut self) {
        self.unmount_video();
        self.unmount_game();
    }

    fn refresh_subscription(&mut self) {
        if self.video.is_none() && self.game.is_none() && self.relay.is_subscribed() {
            self.relay.unsubscribe();
            log::debug!("runner: host relay unsubscribed");
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.relay.is_subscribed()
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn video(&self) -> Option<&PlaybackBridge> {
        self.video.as_ref()
    }

    pub fn game(&self) -> Option<&GameBridge> {
        self.game.as_ref()
    }

    pub fn relay(&self) -> &HostRelay<S> {
        &self.relay
    }

    pub fn loader(&self) -> &LibraryLoader<L> {
        &self.loader
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use super::*;
    use crate::api::types::GameResultEvent;
    use crate::game::bridge::tests::{FakeInstance, RecordingFrame};
    use crate::player::bridge::tests::FakePlayer;
    use crate::player::session::PlaybackSession;
    use crate::relay::host::RecordingSink;
    use crate::schedule::manual::ManualScheduler;
    use serde_json::json;

    const OWN: &str = "https://app.example";
    const URL: &str = "https://www.youtube.com/shorts/z-29NKtciRg";

    #[derive(Default)]
    struct Seen {
        finished: Vec<String>,
        results: Vec<GameResultEvent>,
        failures: u32,
    }

    struct TestHooks(Rc<RefCell<Seen>>);

    impl BridgeHooks for TestHooks {
        fn on_video_finished(&mut self, session: &PlaybackSession) {
            self.0.borrow_mut().finished.push(session.video_id().to_string());
        }

        fn on_game_result(&mut self, result: GameResultEvent) {
            self.0.borrow_mut().results.push(result);
        }

        fn on_load_failed(&mut self, _error: &BridgeError) {
            self.0.borrow_mut().failures += 1;
        }
    }

    #[derive(Default)]
    struct FakeScript {
        present: bool,
        requests: u32,
    }

    impl ScriptSource for FakeScript {
        fn is_present(&self) -> bool {
            self.present
        }

        fn request(&mut self, _src: &str) -> Result<(), BridgeError> {
            self.requests += 1;
            Ok(())
        }
    }

    struct SharedScheduler(Rc<RefCell<ManualScheduler>>);

    impl Scheduler for SharedScheduler {
        fn schedule(&mut self, delay: Duration) -> TaskId {
            self.0.borrow_mut().schedule(delay)
        }

        fn cancel(&mut self, id: TaskId) {
            self.0.borrow_mut().cancel(id)
        }
    }

    struct SharedFrame(Rc<RefCell<RecordingFrame>>);

    impl FrameSink for SharedFrame {
        fn post(&mut self, payload: &str) -> Result<(), BridgeError> {
            self.0.borrow_mut().post(payload)
        }
    }

    struct Harness {
        runner: BridgeRunner<RecordingSink, FakeScript>,
        sched: Rc<RefCell<ManualScheduler>>,
        frame: Rc<RefCell<RecordingFrame>>,
        seen: Rc<RefCell<Seen>>,
    }

    impl Harness {
        fn new(script: FakeScript) -> Self {
            let sched = Rc::new(RefCell::new(ManualScheduler::new()));
            let frame = Rc::new(RefCell::new(RecordingFrame::default()));
            let seen = Rc::new(RefCell::new(Seen::default()));
            let runner = BridgeRunner::new(
                Box::new(TestHooks(Rc::clone(&seen))),
                RecordingSink::default(),
                script,
                Box::new(SharedScheduler(Rc::clone(&sched))),
                Box::new(SharedFrame(Rc::clone(&frame))),
                OWN,
            );
            Self { runner, sched, frame, seen }
        }

        fn advance(&mut self, ms: u64) -> Vec<TimerOutcome> {
            let due = self.sched.borrow_mut().advance(Duration::from_millis(ms));
            due.into_iter().map(|id| self.runner.on_timer(id)).collect()
        }
    }

    #[test]
    fn host_trigger_to_completion() {
        let mut h = Harness::new(FakeScript::default());
        assert_eq!(h.runner.mount_video(URL).unwrap(), VideoMount::AwaitLibrary);
        assert_eq!(h.runner.loader().source().requests, 1);

        let options = h.runner.on_library_ready().expect("view was waiting");
        assert_eq!(options.video_id, "z-29NKtciRg");
        let (player, calls) = FakePlayer::new(true);
        h.runner.attach_player(Box::new(player)).unwrap();

        h.runner.on_message("", &json!("start-playback"));
        h.runner.on_message("", &json!("start-playback"));
        assert_eq!(calls.borrow().plays, 1);

        assert!(h.runner.on_player_state(0));
        assert!(!h.runner.on_player_state(0));
        assert_eq!(h.seen.borrow().finished, vec!["z-29NKtciRg".to_string()]);
        assert_eq!(h.runner.relay().sink().payloads(), vec![r#"{"type":"videoCompleted"}"#]);
    }

    #[test]
    fn library_already_present_constructs_immediately() {
        let mut h = Harness::new(FakeScript {
            present: true,
            ..FakeScript::default()
        });
        assert!(matches!(h.runner.mount_video(URL).unwrap(), VideoMount::Construct(_)));
        assert_eq!(h.runner.loader().source().requests, 0);
    }

    #[test]
    fn invalid_url_is_reported() {
        let mut h = Harness::new(FakeScript::default());
        assert!(matches!(
            h.runner.mount_video("not a url"),
            Err(BridgeError::InvalidInput(_))
        ));
        assert!(h.runner.video().is_none());
        assert!(!h.runner.is_subscribed());
    }

    #[test]
    fn messages_after_unmount_are_ignored() {
        let mut h = Harness::new(FakeScript {
            present: true,
            ..FakeScript::default()
        });
        h.runner.mount_video(URL).unwrap();
        let (player, calls) = FakePlayer::new(true);
        h.runner.attach_player(Box::new(player)).unwrap();

        h.runner.unmount_video();
        assert!(!h.runner.is_subscribed());
        assert_eq!(
            h.runner.on_message("", &json!("start-playback")),
            InboundMessage::Unrecognized
        );
        assert_eq!(calls.borrow().plays, 0);
        assert_eq!(calls.borrow().stops, 1);
    }

    #[test]
    fn remount_starts_a_fresh_session() {
        let mut h = Harness::new(FakeScript {
            present: true,
            ..FakeScript::default()
        });
        h.runner.mount_video(URL).unwrap();
        let (player, _) = FakePlayer::new(true);
        h.runner.attach_player(Box::new(player)).unwrap();
        h.runner.start_playback();
        h.runner.on_player_state(0);

        h.runner.mount_video("https://youtu.be/dQw4w9WgXcQ").unwrap();
        let (player, calls) = FakePlayer::new(true);
        h.runner.attach_player(Box::new(player)).unwrap();
        assert!(!h.runner.video().unwrap().session().started());
        assert_eq!(h.runner.start_playback(), StartOutcome::Played);
        assert_eq!(calls.borrow().plays, 1);
        assert!(h.runner.on_player_state(0));
        assert_eq!(h.seen.borrow().finished.len(), 2);
    }

    #[test]
    fn library_failure_notifies_hooks() {
        let mut h = Harness::new(FakeScript::default());
        h.runner.mount_video(URL).unwrap();
        let err = h.runner.on_library_failed();
        assert!(matches!(err, BridgeError::LoaderFailure { .. }));
        assert_eq!(h.seen.borrow().failures, 1);

        assert_eq!(h.runner.mount_video(URL).unwrap(), VideoMount::Unavailable);
        assert_eq!(h.seen.borrow().failures, 2);
    }

    #[test]
    fn pending_retry_dies_with_the_view() {
        let mut h = Harness::new(FakeScript {
            present: true,
            ..FakeScript::default()
        });
        h.runner.mount_video(URL).unwrap();
        let (player, calls) = FakePlayer::new(false);
        h.runner.attach_player(Box::new(player)).unwrap();
        assert_eq!(h.runner.start_playback(), StartOutcome::RetryScheduled);

        h.runner.unmount_video();
        calls.borrow_mut().ready = true;
        assert!(h.advance(5000).is_empty());
        assert_eq!(calls.borrow().plays, 0);
    }

    #[test]
    fn game_reward_and_result_flow() {
        let mut h = Harness::new(FakeScript::default());
        let build = h.runner.mount_game().clone();
        assert_eq!(build.loader_url(), "/unity/Build/unity_game.loader.js");
        assert_eq!(h.runner.on_game_progress(0.25), 0.25);

        let (instance, calls) = FakeInstance::new();
        h.runner.on_game_created(Box::new(instance));
        assert_eq!(
            h.advance(2000),
            vec![TimerOutcome::RewardSent(GameRewardEvent { points: 100 })]
        );
        assert_eq!(
            h.frame.borrow().posted,
            vec![r#"{"type":"sendPointToUnity","point":100}"#.to_string()]
        );

        let finish = json!({ "name": "GameFinish", "data": { "isCorrect": true } });
        h.runner.on_message(OWN, &finish);
        h.runner.on_message(OWN, &json!({ "name": "GameFinish" }));
        assert_eq!(h.seen.borrow().results, vec![GameResultEvent { is_correct: true }]);
        assert_eq!(
            h.runner.relay().sink().payloads(),
            vec![r#"{"type":"gameFinished","isCorrect":true}"#]
        );

        h.runner.unmount_game();
        assert_eq!(calls.borrow().quits, 1);
        assert!(!h.runner.is_subscribed());
    }

    #[test]
    fn game_unmount_before_settle_sends_no_reward() {
        let mut h = Harness::new(FakeScript::default());
        h.runner.mount_game();
        let (instance, _) = FakeInstance::new();
        h.runner.on_game_created(Box::new(instance));
        h.runner.unmount_game();
        assert!(h.advance(10_000).is_empty());
        assert!(h.frame.borrow().posted.is_empty());
    }

    #[test]
    fn one_view_keeps_the_relay_subscribed() {
        let mut h = Harness::new(FakeScript::default());
        h.runner.mount_game();
        h.runner.mount_video(URL).unwrap();
        h.runner.unmount_video();
        assert!(h.runner.is_subscribed());
        h.runner.shutdown();
        assert!(!h.runner.is_subscribed());
    }

    #[test]
    fn banners_route_through_the_game() {
        let mut h = Harness::new(FakeScript::default());
        assert_eq!(h.runner.on_game_banner(&Banner::new("x", "warning")), None);
        h.runner.mount_game();
        let id = h.runner.on_game_banner(&Banner::new("x", "warning")).unwrap();
        assert_eq!(h.advance(5000), vec![TimerOutcome::DismissBanner(id)]);
    }
}
