use reel_bridge::{BridgeError, GameInstance, UnityBuild};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlCanvasElement, HtmlScriptElement, Window};

/// Global the Unity loader script defines.
const CREATE_INSTANCE: &str = "createUnityInstance";

#[wasm_bindgen]
extern "C" {
    pub type UnityHandle;

    #[wasm_bindgen(method, catch, js_name = SetFullscreen)]
    fn set_fullscreen(this: &UnityHandle, fullscreen: i32) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = Quit)]
    fn quit(this: &UnityHandle) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch, js_name = createUnityInstance)]
    fn create_unity_instance(
        canvas: &HtmlCanvasElement,
        config: &JsValue,
        progress: &js_sys::Function,
    ) -> Result<js_sys::Promise, JsValue>;
}

fn unity_error(what: &str, e: JsValue) -> BridgeError {
    BridgeError::PlayerCall(format!("unity {what}: {e:?}"))
}

/// A running Unity instance.
pub struct UnityGame {
    handle: UnityHandle,
}

impl UnityGame {
    pub fn new(instance: JsValue) -> Self {
        Self {
            handle: instance.unchecked_into(),
        }
    }
}

impl GameInstance for UnityGame {
    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<(), BridgeError> {
        self.handle
            .set_fullscreen(i32::from(fullscreen))
            .map_err(|e| unity_error("SetFullscreen", e))
    }

    fn quit(&mut self) -> Result<(), BridgeError> {
        self.handle.quit().map(|_| ()).map_err(|e| unity_error("Quit", e))
    }
}

/// Callbacks handed to the loader and the runtime. They live as long as
/// the page and route through the runner, so a late callback from an
/// unmounted game is ignored there instead of hitting a dropped closure.
pub struct UnityCallbacks {
    script_loaded: Closure<dyn FnMut(JsValue)>,
    script_failed: Closure<dyn FnMut()>,
    progress: Closure<dyn FnMut(f64)>,
    banner: Closure<dyn FnMut(String, String)>,
    created: Closure<dyn FnMut(JsValue)>,
    failed: Closure<dyn FnMut(JsValue)>,
    fullscreen: Closure<dyn FnMut()>,
}

impl UnityCallbacks {
    pub fn new() -> Self {
        Self {
            script_loaded: Closure::<dyn FnMut(JsValue)>::new(|_: JsValue| {
                crate::runner::on_unity_script_loaded()
            }),
            script_failed: Closure::<dyn FnMut()>::new(|| crate::runner::on_unity_script_failed()),
            progress: Closure::<dyn FnMut(f64)>::new(|progress: f64| {
                crate::runner::on_unity_progress(progress as f32)
            }),
            banner: Closure::<dyn FnMut(String, String)>::new(|message: String, kind: String| {
                crate::runner::on_unity_banner(&message, &kind)
            }),
            created: Closure::<dyn FnMut(JsValue)>::new(|instance: JsValue| {
                crate::runner::on_unity_created(instance)
            }),
            failed: Closure::<dyn FnMut(JsValue)>::new(|error: JsValue| {
                crate::runner::on_unity_failed(error)
            }),
            fullscreen: Closure::<dyn FnMut()>::new(|| crate::runner::set_game_fullscreen(true)),
        }
    }

    pub fn fullscreen(&self) -> &js_sys::Function {
        self.fullscreen.as_ref().unchecked_ref()
    }
}

impl Default for UnityCallbacks {
    fn default() -> Self {
        Self::new()
    }
}

pub fn loader_present(window: &Window) -> bool {
    js_sys::Reflect::get(window, &JsValue::from_str(CREATE_INSTANCE))
        .map(|f| f.is_function())
        .unwrap_or(false)
}

/// Create the instance on a microtask, once the caller has released the
/// runner. `createUnityInstance` reports progress synchronously.
pub fn defer_create(callbacks: &UnityCallbacks) {
    let _ = js_sys::Promise::resolve(&JsValue::UNDEFINED).then(&callbacks.script_loaded);
}

/// Append the build's loader script to `<body>`.
pub fn inject_loader(
    document: &Document,
    build: &UnityBuild,
    callbacks: &UnityCallbacks,
) -> Result<(), BridgeError> {
    let src = build.loader_url();
    let load_error = |e: JsValue| {
        log::error!("unity: {e:?}");
        BridgeError::LoaderFailure { src: src.clone() }
    };
    let script: HtmlScriptElement = document
        .create_element("script")
        .map_err(load_error)?
        .unchecked_into();
    script.set_src(&src);
    script.set_onload(Some(callbacks.script_loaded.as_ref().unchecked_ref()));
    script.set_onerror(Some(callbacks.script_failed.as_ref().unchecked_ref()));
    let body = document
        .body()
        .ok_or_else(|| BridgeError::LoaderFailure { src: src.clone() })?;
    body.append_child(&script).map_err(load_error)?;
    log::info!("unity: requested {src}");
    Ok(())
}

/// Call `createUnityInstance` and route its promise to the callbacks.
pub fn create_instance(
    canvas: &HtmlCanvasElement,
    build: &UnityBuild,
    callbacks: &UnityCallbacks,
) -> Result<(), BridgeError> {
    let json = serde_json::to_string(&build.instance_config())?;
    let config = js_sys::JSON::parse(&json).map_err(|e| unity_error("config", e))?;
    js_sys::Reflect::set(
        &config,
        &JsValue::from_str("showBanner"),
        callbacks.banner.as_ref(),
    )
    .map_err(|e| unity_error("config", e))?;

    let promise = create_unity_instance(canvas, &config, callbacks.progress.as_ref().unchecked_ref())
        .map_err(|e| unity_error(CREATE_INSTANCE, e))?;
    let _ = promise.then2(&callbacks.created, &callbacks.failed);
    log::info!("unity: creating {} {}", build.product_name, build.product_version);
    Ok(())
}
