use std::cell::RefCell;
use std::rc::Rc;

use reel_bridge::{
    Banner, BridgeConfig, BridgeError, BridgeHooks, BridgeRunner, PlayerOptions, RawMessage,
    StartOutcome, TaskId, TimerOutcome, UnityBuild, VideoMount,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlCanvasElement, Window};

use crate::dom;
use crate::host::{MessageSubscription, WindowFrame, WindowHost};
use crate::timer::BrowserScheduler;
use crate::unity::{self, UnityCallbacks, UnityGame};
use crate::youtube::{YoutubePlayer, YoutubeScript};

type Core = BridgeRunner<WindowHost, YoutubeScript>;

thread_local! {
    static RUNNER: RefCell<Option<WebRunner>> = RefCell::new(None);
}

/// Run `f` against the page's runner.
///
/// Returns `None` before `bridge_init()` or when called re-entrantly from
/// a callback fired synchronously inside another bridge call.
fn with_runner<R>(f: impl FnOnce(&mut WebRunner) -> R) -> Option<R> {
    RUNNER.with(|cell| {
        let Ok(mut borrow) = cell.try_borrow_mut() else {
            log::warn!("runner: re-entrant call ignored");
            return None;
        };
        let Some(runner) = borrow.as_mut() else {
            log::warn!("runner: not initialized, call bridge_init() first");
            return None;
        };
        Some(f(runner))
    })
}

struct VideoView {
    container: Element,
    slot: Element,
}

struct GameView {
    canvas: HtmlCanvasElement,
}

/// The core runner plus everything that touches the DOM.
pub struct WebRunner {
    window: Window,
    document: Document,
    core: Core,
    subscription: Option<MessageSubscription>,
    video: Option<VideoView>,
    game: Option<GameView>,
    unity: Rc<UnityCallbacks>,
}

impl WebRunner {
    fn new(window: Window, hooks: Box<dyn BridgeHooks>, config: BridgeConfig) -> Result<Self, BridgeError> {
        let document = window
            .document()
            .ok_or_else(|| BridgeError::Config("window has no document".to_string()))?;
        let own_origin = window.location().origin().unwrap_or_default();
        let core = BridgeRunner::with_config(
            hooks,
            config,
            WindowHost::new(window.clone()),
            YoutubeScript::new(window.clone()),
            Box::new(BrowserScheduler::new(window.clone())),
            Box::new(WindowFrame::new(window.clone(), own_origin.clone())),
            &own_origin,
        );
        Ok(Self {
            window,
            document,
            core,
            subscription: None,
            video: None,
            game: None,
            unity: Rc::new(UnityCallbacks::new()),
        })
    }

    /// Keep the browser listener in step with the relay's subscription.
    fn sync_subscription(&mut self) {
        match (self.core.is_subscribed(), self.subscription.is_some()) {
            (true, false) => match MessageSubscription::new(&self.window) {
                Ok(subscription) => self.subscription = Some(subscription),
                Err(e) => log::error!("runner: {e}"),
            },
            (false, true) => self.subscription = None,
            _ => {}
        }
    }

    // ---- Video ----

    fn mount_video(&mut self, container_id: &str, url: &str) -> bool {
        self.unmount_video();
        let Some(container) = self.document.get_element_by_id(container_id) else {
            log::error!("runner: no element #{container_id}");
            return false;
        };

        let mounted = match self.core.mount_video(url) {
            Ok(mount) => match dom::prepare_video_stage(&self.document, &container) {
                Ok(slot) => {
                    self.video = Some(VideoView { container, slot });
                    self.handle_mount(mount)
                }
                Err(e) => {
                    log::error!("runner: {e}");
                    self.core.unmount_video();
                    false
                }
            },
            Err(_) => {
                dom::render_invalid_url(&container);
                false
            }
        };
        self.sync_subscription();
        mounted
    }

    fn handle_mount(&mut self, mount: VideoMount) -> bool {
        match mount {
            VideoMount::Construct(options) => self.construct_player(&options),
            VideoMount::AwaitLibrary => true,
            VideoMount::Unavailable => {
                dom::alert(&self.window, dom::VIDEO_LOAD_FAILED_TEXT);
                false
            }
        }
    }

    fn construct_player(&mut self, options: &PlayerOptions) -> bool {
        let Some(view) = self.video.as_ref() else {
            return false;
        };
        let attached = YoutubePlayer::construct(&view.slot, options)
            .and_then(|player| self.core.attach_player(Box::new(player)));
        match attached {
            Ok(()) => true,
            Err(e) => {
                log::error!("runner: {e}");
                false
            }
        }
    }

    fn on_library_ready(&mut self) {
        if let Some(options) = self.core.on_library_ready() {
            self.construct_player(&options);
        }
    }

    fn on_library_failed(&mut self) {
        self.core.on_library_failed();
        if self.video.is_some() {
            dom::alert(&self.window, dom::VIDEO_LOAD_FAILED_TEXT);
        }
    }

    fn on_player_state(&mut self, code: i32) {
        if !self.core.on_player_state(code) {
            return;
        }
        if let Some(view) = self.video.as_ref() {
            if let Err(e) = dom::show_finished(&self.document, &view.container) {
                log::warn!("runner: {e}");
            }
        }
    }

    fn unmount_video(&mut self) {
        self.core.unmount_video();
        if let Some(view) = self.video.take() {
            dom::clear(&view.container);
        }
        self.sync_subscription();
    }

    // ---- Game ----

    fn mount_game(&mut self, canvas_id: &str) -> bool {
        self.unmount_game();
        let Some(canvas) = self
            .document
            .get_element_by_id(canvas_id)
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("runner: no canvas #{canvas_id}");
            return false;
        };

        let device = dom::apply_device_layout(&self.window, &self.document, &canvas);
        log::debug!("runner: game layout {device:?}");
        dom::set_loading_bar(&self.document, true);
        let build = self.core.mount_game().clone();
        self.game = Some(GameView { canvas });
        self.sync_subscription();

        let requested = if unity::loader_present(&self.window) {
            unity::defer_create(&self.unity);
            Ok(())
        } else {
            unity::inject_loader(&self.document, &build, &self.unity)
        };
        match requested {
            Ok(()) => true,
            Err(e) => {
                self.game_failed(e);
                false
            }
        }
    }

    /// What `createUnityInstance` needs, cloned out so the call itself runs
    /// without the runner borrowed.
    fn game_request(&self) -> Option<(HtmlCanvasElement, UnityBuild, Rc<UnityCallbacks>)> {
        let view = self.game.as_ref()?;
        Some((
            view.canvas.clone(),
            self.core.config().unity.clone(),
            Rc::clone(&self.unity),
        ))
    }

    fn on_game_created(&mut self, instance: JsValue) {
        let game = UnityGame::new(instance);
        if self.game.is_some() {
            dom::set_loading_bar(&self.document, false);
            if let Some(button) = dom::html_element(&self.document, dom::UNITY_FULLSCREEN_BUTTON) {
                button.set_onclick(Some(self.unity.fullscreen()));
            }
        }
        self.core.on_game_created(Box::new(game));
    }

    fn game_failed(&mut self, error: BridgeError) {
        log::error!("runner: {error}");
        let mounted = self.game.is_some();
        self.core.on_game_failed(error);
        if mounted {
            dom::alert(&self.window, dom::GAME_LOAD_FAILED_TEXT);
        }
    }

    fn on_game_banner(&mut self, message: &str, kind: &str) {
        if self.game.is_none() {
            return;
        }
        let banner = Banner::new(message, kind);
        let id = self.core.on_game_banner(&banner);
        if let Err(e) = dom::show_banner(&self.document, id, &banner) {
            log::warn!("runner: {e}");
        }
    }

    fn unmount_game(&mut self) {
        self.core.unmount_game();
        if self.game.take().is_some() {
            if let Some(button) = dom::html_element(&self.document, dom::UNITY_FULLSCREEN_BUTTON) {
                button.set_onclick(None);
            }
            dom::set_loading_bar(&self.document, false);
            dom::clear_banners(&self.document);
        }
        self.sync_subscription();
    }

    // ---- Shared ----

    fn on_timer(&mut self, id: TaskId) {
        match self.core.on_timer(id) {
            TimerOutcome::DismissBanner(banner) => dom::dismiss_banner(&self.document, banner),
            TimerOutcome::Ignored => log::debug!("runner: stale timer {id:?}"),
            outcome => log::debug!("runner: timer -> {outcome:?}"),
        }
    }

    fn shutdown(&mut self) {
        self.unmount_video();
        self.unmount_game();
    }
}

// ---- Entry points used by the exported functions ----

pub fn init(hooks: Box<dyn BridgeHooks>, config_json: Option<&str>, app_name: &str) {
    console_error_panic_hook::set_once();

    let (config, override_error) = match config_json.map(BridgeConfig::from_json) {
        Some(Ok(config)) => (config, None),
        Some(Err(e)) => (hooks.config(), Some(e)),
        None => (hooks.config(), None),
    };
    let _ = console_log::init_with_level(config.log_level());
    if let Some(e) = override_error {
        log::warn!("{app_name}: config override ignored: {e}");
    }

    let Some(window) = web_sys::window() else {
        log::error!("{app_name}: no window");
        return;
    };
    let runner = match WebRunner::new(window, hooks, config) {
        Ok(runner) => runner,
        Err(e) => {
            log::error!("{app_name}: {e}");
            return;
        }
    };

    let previous = RUNNER.with(|cell| match cell.try_borrow_mut() {
        Ok(mut slot) => Ok(slot.replace(runner)),
        Err(_) => Err(()),
    });
    match previous {
        Ok(Some(mut old)) => {
            old.shutdown();
            log::info!("{app_name}: re-initialized");
        }
        Ok(None) => log::info!("{app_name}: initialized"),
        Err(()) => log::error!("{app_name}: bridge_init() called from inside a callback"),
    }
}

pub fn mount_video(container_id: &str, url: &str) -> bool {
    with_runner(|r| r.mount_video(container_id, url)).unwrap_or(false)
}

/// Returns whether a play command went out or a retry is pending.
pub fn start_video() -> bool {
    matches!(
        with_runner(|r| r.core.start_playback()),
        Some(StartOutcome::Played | StartOutcome::RetryScheduled | StartOutcome::AlreadyStarted)
    )
}

pub fn unmount_video() {
    with_runner(|r| r.unmount_video());
}

pub fn video_position() -> f64 {
    with_runner(|r| r.core.video().map(|v| v.position()))
        .flatten()
        .unwrap_or(0.0)
}

pub fn video_duration() -> f64 {
    with_runner(|r| r.core.video().map(|v| v.duration()))
        .flatten()
        .unwrap_or(0.0)
}

pub fn mount_game(canvas_id: &str) -> bool {
    with_runner(|r| r.mount_game(canvas_id)).unwrap_or(false)
}

pub fn set_game_fullscreen(fullscreen: bool) {
    with_runner(|r| r.core.set_game_fullscreen(fullscreen));
}

pub fn unmount_game() {
    with_runner(|r| r.unmount_game());
}

pub fn shutdown() {
    with_runner(|r| r.shutdown());
}

// ---- Browser callbacks ----

pub(crate) fn on_timer(id: TaskId) {
    with_runner(|r| r.on_timer(id));
}

pub(crate) fn on_message(origin: &str, raw: &RawMessage) {
    with_runner(|r| r.core.on_message(origin, raw));
}

pub(crate) fn on_library_ready() {
    with_runner(|r| r.on_library_ready());
}

pub(crate) fn on_library_failed() {
    with_runner(|r| r.on_library_failed());
}

pub(crate) fn on_player_ready() {
    with_runner(|r| r.core.on_player_ready());
}

pub(crate) fn on_player_state(code: i32) {
    with_runner(|r| r.on_player_state(code));
}

pub(crate) fn on_unity_script_loaded() {
    let Some(Some((canvas, build, callbacks))) = with_runner(|r| r.game_request()) else {
        return;
    };
    // The runtime reports progress synchronously from inside this call.
    if let Err(e) = unity::create_instance(&canvas, &build, &callbacks) {
        with_runner(|r| r.game_failed(e));
    }
}

pub(crate) fn on_unity_script_failed() {
    with_runner(|r| {
        let src = r.core.config().unity.loader_url();
        r.game_failed(BridgeError::LoaderFailure { src });
    });
}

pub(crate) fn on_unity_progress(progress: f32) {
    with_runner(|r| {
        if r.game.is_some() {
            let progress = r.core.on_game_progress(progress);
            dom::set_progress(&r.document, progress);
        }
    });
}

pub(crate) fn on_unity_banner(message: &str, kind: &str) {
    with_runner(|r| r.on_game_banner(message, kind));
}

pub(crate) fn on_unity_created(instance: JsValue) {
    with_runner(|r| r.on_game_created(instance));
}

pub(crate) fn on_unity_failed(error: JsValue) {
    with_runner(|r| {
        let src = r.core.config().unity.loader_url();
        log::error!("runner: createUnityInstance rejected: {error:?}");
        r.game_failed(BridgeError::LoaderFailure { src });
    });
}
