use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;
use crate::game::build::UnityBuild;
use crate::protocol::origin::OriginPolicy;

/// Script that installs the YouTube IFrame API.
pub const YOUTUBE_IFRAME_API_URL: &str = "https://www.youtube.com/iframe_api";

/// Runtime configuration for both bridges.
///
/// Every field has a default, so a partial JSON document is enough to
/// override a single value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Delay before the single play retry (default: 1000).
    pub play_retry_delay_ms: u32,
    /// Delay between the game frame loading and the reward post (default: 2000).
    pub reward_settle_delay_ms: u32,
    /// Points posted into the game frame (default: 100).
    pub reward_points: u32,
    /// How long warning banners stay on screen (default: 5000).
    pub banner_dismiss_ms: u32,
    /// Extra origins allowed to talk to this page. The page's own origin is
    /// always allowed.
    pub allowed_origins: Vec<String>,
    /// Accept messages with an empty origin, as injected by the native shell.
    pub allow_native_host: bool,
    /// Loader script for the embedded player library.
    pub player_loader_url: String,
    /// Unity WebGL build manifest.
    pub unity: UnityBuild,
    /// Console log level: error, warn, info, debug or trace.
    pub log_level: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            play_retry_delay_ms: 1000,
            reward_settle_delay_ms: 2000,
            reward_points: 100,
            banner_dismiss_ms: 5000,
            allowed_origins: Vec::new(),
            allow_native_host: true,
            player_loader_url: YOUTUBE_IFRAME_API_URL.to_string(),
            unity: UnityBuild::default(),
            log_level: "info".to_string(),
        }
    }
}

impl BridgeConfig {
    /// Parse a config from a JSON string. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, BridgeError> {
        serde_json::from_str(json).map_err(|e| BridgeError::Config(e.to_string()))
    }

    pub fn play_retry_delay(&self) -> Duration {
        Duration::from_millis(self.play_retry_delay_ms as u64)
    }

    pub fn reward_settle_delay(&self) -> Duration {
        Duration::from_millis(self.reward_settle_delay_ms as u64)
    }

    pub fn banner_dismiss_delay(&self) -> Duration {
        Duration::from_millis(self.banner_dismiss_ms as u64)
    }

    /// Origin policy for a page served from `own_origin`.
    pub fn origin_policy(&self, own_origin: &str) -> OriginPolicy {
        OriginPolicy::new(own_origin, self.allowed_origins.iter().cloned())
            .with_native_host(self.allow_native_host)
    }

    /// Parsed log level. Unknown names fall back to `Info`.
    pub fn log_level(&self) -> log::Level {
        log::Level::from_str(&self.log_level).unwrap_or(log::Level::Info)
    }
}
