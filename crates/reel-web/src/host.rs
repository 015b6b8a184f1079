use reel_bridge::{BridgeError, FrameSink, HostSink, RawMessage};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{EventTarget, MessageEvent, Window};

/// Property the React Native WebView injects on `window`.
const NATIVE_BRIDGE: &str = "ReactNativeWebView";

fn js_error(e: JsValue) -> BridgeError {
    BridgeError::Post(format!("{e:?}"))
}

/// Posts to the native shell when it is present, otherwise to the parent
/// browsing context.
pub struct WindowHost {
    window: Window,
}

impl WindowHost {
    pub fn new(window: Window) -> Self {
        Self { window }
    }

    fn native_post(&self) -> Option<(JsValue, js_sys::Function)> {
        let bridge = js_sys::Reflect::get(&self.window, &JsValue::from_str(NATIVE_BRIDGE)).ok()?;
        if bridge.is_undefined() || bridge.is_null() {
            return None;
        }
        let post = js_sys::Reflect::get(&bridge, &JsValue::from_str("postMessage")).ok()?;
        let post = post.dyn_into::<js_sys::Function>().ok()?;
        Some((bridge, post))
    }
}

impl HostSink for WindowHost {
    fn post(&mut self, payload: &str, target_origin: &str) -> Result<(), BridgeError> {
        if let Some((bridge, post)) = self.native_post() {
            post.call1(&bridge, &JsValue::from_str(payload)).map_err(js_error)?;
            return Ok(());
        }
        let parent = self
            .window
            .parent()
            .map_err(js_error)?
            .ok_or_else(|| BridgeError::Post("no parent window".to_string()))?;
        parent
            .post_message(&JsValue::from_str(payload), target_origin)
            .map_err(js_error)
    }
}

/// Posts into the game frame, which shares the page's window.
pub struct WindowFrame {
    window: Window,
    origin: String,
}

impl WindowFrame {
    pub fn new(window: Window, origin: impl Into<String>) -> Self {
        Self {
            window,
            origin: origin.into(),
        }
    }
}

impl FrameSink for WindowFrame {
    fn post(&mut self, payload: &str) -> Result<(), BridgeError> {
        // The game listens for an object, not a JSON string.
        let message = js_sys::JSON::parse(payload).map_err(js_error)?;
        self.window.post_message(&message, &self.origin).map_err(js_error)
    }
}

/// `message` listener registration. Dropping it removes the listener.
///
/// react-native-webview dispatches on `document` on Android and on `window`
/// on iOS, so both targets are registered.
pub struct MessageSubscription {
    targets: Vec<EventTarget>,
    callback: Closure<dyn FnMut(MessageEvent)>,
}

impl MessageSubscription {
    pub fn new(window: &Window) -> Result<Self, BridgeError> {
        let callback = Closure::<dyn FnMut(MessageEvent)>::new(|event: MessageEvent| {
            let raw = message_data(&event.data());
            crate::runner::on_message(&event.origin(), &raw);
        });

        let mut targets: Vec<EventTarget> = vec![window.clone().into()];
        if let Some(document) = window.document() {
            targets.push(document.into());
        }
        for target in &targets {
            target
                .add_event_listener_with_callback("message", callback.as_ref().unchecked_ref())
                .map_err(js_error)?;
        }
        log::debug!("host: listening for messages");
        Ok(Self { targets, callback })
    }
}

impl Drop for MessageSubscription {
    fn drop(&mut self) {
        for target in &self.targets {
            let _ = target
                .remove_event_listener_with_callback("message", self.callback.as_ref().unchecked_ref());
        }
        log::debug!("host: stopped listening for messages");
    }
}

/// Convert `MessageEvent.data` into a JSON value.
///
/// Strings are kept as strings; the core decides whether they carry JSON.
fn message_data(data: &JsValue) -> RawMessage {
    if let Some(text) = data.as_string() {
        return RawMessage::String(text);
    }
    let json = match js_sys::JSON::stringify(data) {
        Ok(json) => String::from(json),
        Err(e) => {
            log::debug!("host: unserializable message dropped: {e:?}");
            return RawMessage::Null;
        }
    };
    serde_json::from_str(&json).unwrap_or_else(|e| {
        log::debug!("host: unreadable message dropped: {e}");
        RawMessage::Null
    })
}
