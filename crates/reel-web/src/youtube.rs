use reel_bridge::{BridgeError, PlayerHandle, PlayerOptions, PlayerState, ScriptSource};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlScriptElement, Window};

/// Global the IFrame API calls once `YT.Player` is usable.
const READY_CALLBACK: &str = "onYouTubeIframeAPIReady";

mod yt {
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_namespace = YT)]
        pub type Player;

        #[wasm_bindgen(constructor, js_namespace = YT, catch)]
        pub fn new(element: &web_sys::Element, options: &JsValue) -> Result<Player, JsValue>;

        #[wasm_bindgen(method, catch, js_name = playVideo)]
        pub fn play_video(this: &Player) -> Result<(), JsValue>;

        #[wasm_bindgen(method, catch, js_name = pauseVideo)]
        pub fn pause_video(this: &Player) -> Result<(), JsValue>;

        #[wasm_bindgen(method, catch, js_name = stopVideo)]
        pub fn stop_video(this: &Player) -> Result<(), JsValue>;

        #[wasm_bindgen(method, catch, js_name = seekTo)]
        pub fn seek_to(this: &Player, seconds: f64, allow_seek_ahead: bool) -> Result<(), JsValue>;

        #[wasm_bindgen(method, catch, js_name = getPlayerState)]
        pub fn get_player_state(this: &Player) -> Result<f64, JsValue>;

        #[wasm_bindgen(method, catch, js_name = getCurrentTime)]
        pub fn get_current_time(this: &Player) -> Result<f64, JsValue>;

        #[wasm_bindgen(method, catch, js_name = getDuration)]
        pub fn get_duration(this: &Player) -> Result<f64, JsValue>;

        #[wasm_bindgen(method, catch)]
        pub fn destroy(this: &Player) -> Result<(), JsValue>;
    }
}

fn call_error(method: &str, e: JsValue) -> BridgeError {
    BridgeError::PlayerCall(format!("{method}: {e:?}"))
}

fn has_function(target: &JsValue, name: &str) -> bool {
    js_sys::Reflect::get(target, &JsValue::from_str(name))
        .map(|value| value.is_function())
        .unwrap_or(false)
}

/// One `YT.Player` plus the event closures it calls into.
pub struct YoutubePlayer {
    player: yt::Player,
    _on_ready: Closure<dyn FnMut(JsValue)>,
    _on_state_change: Closure<dyn FnMut(JsValue)>,
}

impl YoutubePlayer {
    /// Replace `element` with an IFrame player configured by `options`.
    pub fn construct(element: &Element, options: &PlayerOptions) -> Result<Self, BridgeError> {
        let config = js_sys::JSON::parse(&options.to_json()?)
            .map_err(|e| BridgeError::PlayerCall(format!("options: {e:?}")))?;

        let on_ready = Closure::<dyn FnMut(JsValue)>::new(|_event: JsValue| {
            crate::runner::on_player_ready();
        });
        let on_state_change = Closure::<dyn FnMut(JsValue)>::new(|event: JsValue| {
            let code = js_sys::Reflect::get(&event, &JsValue::from_str("data"))
                .ok()
                .and_then(|data| data.as_f64());
            match code {
                Some(code) => crate::runner::on_player_state(code as i32),
                None => log::debug!("youtube: state change without data"),
            }
        });

        let events = js_sys::Object::new();
        let set = |key: &str, value: &JsValue| {
            js_sys::Reflect::set(&events, &JsValue::from_str(key), value)
                .map_err(|e| BridgeError::PlayerCall(format!("events: {e:?}")))
        };
        set("onReady", on_ready.as_ref())?;
        set("onStateChange", on_state_change.as_ref())?;
        js_sys::Reflect::set(&config, &JsValue::from_str("events"), &events)
            .map_err(|e| BridgeError::PlayerCall(format!("events: {e:?}")))?;

        let player = yt::Player::new(element, &config).map_err(|e| call_error("new", e))?;
        log::info!("youtube: player constructed for {}", options.video_id);
        Ok(Self {
            player,
            _on_ready: on_ready,
            _on_state_change: on_state_change,
        })
    }
}

impl PlayerHandle for YoutubePlayer {
    fn can_play(&self) -> bool {
        has_function(&self.player, "playVideo")
    }

    fn play(&mut self) -> Result<(), BridgeError> {
        self.player.play_video().map_err(|e| call_error("playVideo", e))
    }

    fn pause(&mut self) -> Result<(), BridgeError> {
        self.player.pause_video().map_err(|e| call_error("pauseVideo", e))
    }

    fn stop(&mut self) -> Result<(), BridgeError> {
        self.player.stop_video().map_err(|e| call_error("stopVideo", e))
    }

    fn seek(&mut self, seconds: f64, allow_seek_ahead: bool) -> Result<(), BridgeError> {
        self.player
            .seek_to(seconds, allow_seek_ahead)
            .map_err(|e| call_error("seekTo", e))
    }

    fn state(&self) -> PlayerState {
        match self.player.get_player_state() {
            Ok(code) => PlayerState::from_code(code as i32),
            Err(_) => PlayerState::Unstarted,
        }
    }

    fn position(&self) -> f64 {
        self.player.get_current_time().unwrap_or(0.0)
    }

    fn duration(&self) -> f64 {
        self.player.get_duration().unwrap_or(0.0)
    }
}

impl Drop for YoutubePlayer {
    fn drop(&mut self) {
        // Detach the IFrame before the event closures go away.
        if has_function(&self.player, "destroy") {
            if let Err(e) = self.player.destroy() {
                log::debug!("youtube: destroy failed: {e:?}");
            }
        }
    }
}

/// Inserts the IFrame API script and installs the global readiness
/// callback.
pub struct YoutubeScript {
    window: Window,
    on_ready: Option<Closure<dyn FnMut()>>,
    on_error: Option<Closure<dyn FnMut()>>,
}

impl YoutubeScript {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            on_ready: None,
            on_error: None,
        }
    }
}

impl ScriptSource for YoutubeScript {
    fn is_present(&self) -> bool {
        js_sys::Reflect::get(&self.window, &JsValue::from_str("YT"))
            .map(|yt| has_function(&yt, "Player"))
            .unwrap_or(false)
    }

    fn request(&mut self, src: &str) -> Result<(), BridgeError> {
        let document = self
            .window
            .document()
            .ok_or_else(|| BridgeError::LoaderFailure { src: src.to_string() })?;
        let load_error = |e: JsValue| {
            log::error!("youtube: {e:?}");
            BridgeError::LoaderFailure { src: src.to_string() }
        };

        let on_ready = Closure::<dyn FnMut()>::new(|| crate::runner::on_library_ready());
        js_sys::Reflect::set(
            &self.window,
            &JsValue::from_str(READY_CALLBACK),
            on_ready.as_ref().unchecked_ref(),
        )
        .map_err(load_error)?;

        let script: HtmlScriptElement = document
            .create_element("script")
            .map_err(load_error)?
            .unchecked_into();
        script.set_src(src);
        let on_error = Closure::<dyn FnMut()>::new(|| crate::runner::on_library_failed());
        script.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        let first_script = document.get_elements_by_tag_name("script").item(0);
        match first_script.and_then(|first| first.parent_node().map(|parent| (parent, first))) {
            Some((parent, first)) => {
                parent.insert_before(&script, Some(&first)).map_err(load_error)?;
            }
            None => {
                let head = document
                    .head()
                    .ok_or_else(|| BridgeError::LoaderFailure { src: src.to_string() })?;
                head.append_child(&script).map_err(load_error)?;
            }
        }

        self.on_ready = Some(on_ready);
        self.on_error = Some(on_error);
        log::info!("youtube: requested {src}");
        Ok(())
    }
}
