use reel_bridge::{Banner, BannerId, BridgeError, DeviceClass};
use reel_bridge::game::device::{DESKTOP_CANVAS, MOBILE_CLASS, MOBILE_VIEWPORT};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlMetaElement, Window};

pub const UNITY_CONTAINER: &str = "unity-container";
pub const UNITY_LOADING_BAR: &str = "unity-loading-bar";
pub const UNITY_PROGRESS_FULL: &str = "unity-progress-bar-full";
pub const UNITY_WARNING: &str = "unity-warning";
pub const UNITY_FULLSCREEN_BUTTON: &str = "unity-fullscreen-button";

const BANNER_ATTR: &str = "data-banner-id";

const FULL_PAGE: &str = "position: fixed; top: 0; left: 0; width: 100vw; height: 100vh; \
     background-color: #000;";
const INVALID_URL_STYLE: &str = "position: fixed; top: 0; left: 0; width: 100vw; height: 100vh; \
     background-color: #000; display: flex; align-items: center; justify-content: center; \
     color: white; font-size: 18px;";
const FINISHED_STYLE: &str = "position: absolute; bottom: 50px; left: 50%; \
     transform: translateX(-50%); padding: 10px 20px; \
     background-color: rgba(230, 255, 230, 0.9); border-radius: 5px; font-size: 18px; \
     font-weight: bold; color: #006600;";

pub const INVALID_URL_TEXT: &str = "Invalid YouTube URL.";
pub const FINISHED_TEXT: &str = "\u{2705} Finished watching!";
pub const VIDEO_LOAD_FAILED_TEXT: &str = "The video player could not be loaded.";
pub const GAME_LOAD_FAILED_TEXT: &str = "An error occurred while loading the game.";

fn dom_error(e: JsValue) -> BridgeError {
    BridgeError::Dom(format!("{e:?}"))
}

pub fn html_element(document: &Document, id: &str) -> Option<HtmlElement> {
    document.get_element_by_id(id)?.dyn_into::<HtmlElement>().ok()
}

fn set_style(element: &HtmlElement, property: &str, value: &str) {
    if let Err(e) = element.style().set_property(property, value) {
        log::debug!("dom: style {property} not applied: {e:?}");
    }
}

pub fn alert(window: &Window, message: &str) {
    if let Err(e) = window.alert_with_message(message) {
        log::debug!("dom: alert failed: {e:?}");
    }
}

// ---- Video ----

/// Turn `container` into a full-page black stage and return the child the
/// player replaces.
pub fn prepare_video_stage(document: &Document, container: &Element) -> Result<Element, BridgeError> {
    container.set_inner_html("");
    container.set_attribute("style", FULL_PAGE).map_err(dom_error)?;
    let slot = document.create_element("div").map_err(dom_error)?;
    slot.set_attribute("style", "width: 100%; height: 100%;").map_err(dom_error)?;
    container.append_child(&slot).map_err(dom_error)?;
    Ok(slot)
}

pub fn render_invalid_url(container: &Element) {
    container.set_inner_html("");
    if let Err(e) = container.set_attribute("style", INVALID_URL_STYLE) {
        log::debug!("dom: {e:?}");
    }
    container.set_text_content(Some(INVALID_URL_TEXT));
}

pub fn show_finished(document: &Document, container: &Element) -> Result<(), BridgeError> {
    let overlay = document.create_element("div").map_err(dom_error)?;
    overlay.set_attribute("style", FINISHED_STYLE).map_err(dom_error)?;
    overlay.set_text_content(Some(FINISHED_TEXT));
    container.append_child(&overlay).map_err(dom_error)?;
    Ok(())
}

pub fn clear(container: &Element) {
    container.set_inner_html("");
    let _ = container.remove_attribute("style");
}

// ---- Game ----

/// Size the canvas for the device; phones also get a fixed viewport.
pub fn apply_device_layout(window: &Window, document: &Document, canvas: &HtmlElement) -> DeviceClass {
    let agent = window.navigator().user_agent().unwrap_or_default();
    let device = DeviceClass::from_user_agent(&agent);
    match device {
        DeviceClass::Mobile => {
            if let Err(e) = add_viewport_meta(document) {
                log::warn!("dom: viewport meta not added: {e}");
            }
            if let Some(container) = document.get_element_by_id(UNITY_CONTAINER) {
                container.set_class_name(MOBILE_CLASS);
            }
            canvas.set_class_name(MOBILE_CLASS);
        }
        DeviceClass::Desktop => {
            let (width, height) = DESKTOP_CANVAS;
            set_style(canvas, "width", &format!("{width}px"));
            set_style(canvas, "height", &format!("{height}px"));
        }
    }
    device
}

fn add_viewport_meta(document: &Document) -> Result<(), BridgeError> {
    let head = document
        .head()
        .ok_or_else(|| BridgeError::Dom("no <head>".to_string()))?;
    let meta: HtmlMetaElement = document
        .create_element("meta")
        .map_err(dom_error)?
        .unchecked_into();
    meta.set_name("viewport");
    meta.set_content(MOBILE_VIEWPORT);
    head.append_child(&meta).map_err(dom_error)?;
    Ok(())
}

pub fn set_loading_bar(document: &Document, visible: bool) {
    if let Some(bar) = html_element(document, UNITY_LOADING_BAR) {
        set_style(&bar, "display", if visible { "block" } else { "none" });
    }
}

pub fn set_progress(document: &Document, progress: f32) {
    if let Some(bar) = html_element(document, UNITY_PROGRESS_FULL) {
        set_style(&bar, "width", &format!("{}%", progress * 100.0));
    }
}

pub fn show_banner(document: &Document, id: Option<BannerId>, banner: &Banner) -> Result<(), BridgeError> {
    let Some(area) = html_element(document, UNITY_WARNING) else {
        return Ok(());
    };
    let div = document.create_element("div").map_err(dom_error)?;
    div.set_text_content(Some(&banner.message));
    let style = banner.kind.style();
    if !style.is_empty() {
        div.set_attribute("style", style).map_err(dom_error)?;
    }
    if let Some(id) = id {
        div.set_attribute(BANNER_ATTR, &id.0.to_string()).map_err(dom_error)?;
    }
    area.append_child(&div).map_err(dom_error)?;
    update_banner_visibility(&area);
    Ok(())
}

pub fn dismiss_banner(document: &Document, id: BannerId) {
    let Some(area) = html_element(document, UNITY_WARNING) else {
        return;
    };
    let selector = format!("[{BANNER_ATTR}=\"{}\"]", id.0);
    if let Ok(Some(div)) = area.query_selector(&selector) {
        div.remove();
    }
    update_banner_visibility(&area);
}

fn update_banner_visibility(area: &HtmlElement) {
    let display = if area.child_element_count() > 0 { "block" } else { "none" };
    set_style(area, "display", display);
}

pub fn clear_banners(document: &Document) {
    if let Some(area) = html_element(document, UNITY_WARNING) {
        area.set_inner_html("");
        update_banner_visibility(&area);
    }
}
