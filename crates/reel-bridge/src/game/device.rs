use once_cell::sync::Lazy;
use regex::Regex;

static MOBILE_AGENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)iPhone|iPad|iPod|Android").expect("mobile agent regex should compile"));

/// Desktop canvas size in CSS pixels.
pub const DESKTOP_CANVAS: (u32, u32) = (1280, 720);

/// Viewport meta applied on phones and tablets.
pub const MOBILE_VIEWPORT: &str =
    "width=device-width, height=device-height, initial-scale=1.0, user-scalable=no, shrink-to-fit=yes";

/// CSS class for the game container and canvas on mobile.
pub const MOBILE_CLASS: &str = "unity-mobile";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Mobile,
    Desktop,
}

impl DeviceClass {
    pub fn from_user_agent(user_agent: &str) -> Self {
        if MOBILE_AGENT.is_match(user_agent) {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }
}
