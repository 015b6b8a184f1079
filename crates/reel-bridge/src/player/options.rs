use serde::Serialize;

use crate::video::id::VideoId;

/// `playerVars` handed to the IFrame API. Everything interactive is off:
/// the page drives playback, the user only watches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerVars {
    pub autoplay: u8,
    pub controls: u8,
    pub modestbranding: u8,
    pub rel: u8,
    #[serde(rename = "loop")]
    pub loop_: u8,
    pub mute: u8,
    pub playsinline: u8,
    pub fs: u8,
    pub iv_load_policy: u8,
    pub showinfo: u8,
    pub disablekb: u8,
}

impl Default for PlayerVars {
    fn default() -> Self {
        Self {
            autoplay: 0,
            controls: 0,
            modestbranding: 1,
            rel: 0,
            loop_: 0,
            mute: 0,
            playsinline: 1,
            fs: 0,
            iv_load_policy: 3,
            showinfo: 0,
            disablekb: 1,
        }
    }
}

/// Construction options for one player, minus the event handlers which the
/// browser layer attaches itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerOptions {
    pub height: String,
    pub width: String,
    pub video_id: String,
    pub player_vars: PlayerVars,
}

impl PlayerOptions {
    pub fn new(video_id: &VideoId) -> Self {
        Self {
            height: "100%".to_string(),
            width: "100%".to_string(),
            video_id: video_id.as_str().to_string(),
            player_vars: PlayerVars::default(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
