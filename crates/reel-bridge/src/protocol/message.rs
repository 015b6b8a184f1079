//! Wire messages exchanged with the native host and the embedded game frame.
//!
//! ```text
//! host  -> page   "start-playback" (also "startPlayback" or {"type": "startPlayback"})
//! frame -> page   {"name": "GameFinish", "data": {"isCorrect": true}}
//! page  -> frame  {"type": "sendPointToUnity", "point": 100}
//! page  -> host   {"type": "videoCompleted"}
//!                 {"type": "gameFinished", "isCorrect": true}
//! ```
//!
//! `gameFinished` is an addition of this page: hosts that only know
//! `videoCompleted` and `sendPointToUnity` ignore it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::types::{GameRewardEvent, GameResultEvent};
use crate::error::BridgeError;

/// An inbound message as delivered by the platform: a bare string or a
/// structured value.
pub type RawMessage = Value;

const START_PLAYBACK_TAGS: [&str; 2] = ["start-playback", "startPlayback"];
const GAME_FINISH: &str = "GameFinish";

/// Messages the page acts on. Anything else is `Unrecognized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundMessage {
    /// The host asks the player to start.
    StartPlayback,
    /// The game frame finished a round.
    GameFinish(GameResultEvent),
    /// Unknown tag or shape. Always a no-op.
    Unrecognized,
}

#[derive(Deserialize)]
struct FrameEnvelope {
    name: String,
    #[serde(default)]
    data: Option<Value>,
}

impl InboundMessage {
    /// Classify a raw message.
    ///
    /// Unknown tags are `Ok(Unrecognized)`. A recognized tag with a broken
    /// payload is an error so the caller can log it.
    pub fn parse(raw: &RawMessage) -> Result<Self, BridgeError> {
        match raw {
            Value::String(s) => Self::parse_str(s),
            Value::Object(map) => {
                if let Some(tag) = map.get("type").and_then(Value::as_str) {
                    return Ok(Self::from_trigger_tag(tag));
                }
                if map.contains_key("name") {
                    let envelope: FrameEnvelope = serde_json::from_value(raw.clone())?;
                    return Self::from_frame(envelope);
                }
                Ok(InboundMessage::Unrecognized)
            }
            _ => Ok(InboundMessage::Unrecognized),
        }
    }

    fn parse_str(s: &str) -> Result<Self, BridgeError> {
        let trimmed = s.trim();
        if trimmed.starts_with('{') {
            let value: Value = serde_json::from_str(trimmed)?;
            return Self::parse(&value);
        }
        Ok(Self::from_trigger_tag(trimmed))
    }

    fn from_trigger_tag(tag: &str) -> Self {
        if START_PLAYBACK_TAGS.contains(&tag) {
            InboundMessage::StartPlayback
        } else {
            InboundMessage::Unrecognized
        }
    }

    fn from_frame(envelope: FrameEnvelope) -> Result<Self, BridgeError> {
        if envelope.name != GAME_FINISH {
            return Ok(InboundMessage::Unrecognized);
        }
        let data = envelope
            .data
            .ok_or_else(|| BridgeError::MessageParse("GameFinish without data".to_string()))?;
        let is_correct = data
            .get("isCorrect")
            .and_then(Value::as_bool)
            .ok_or_else(|| {
                BridgeError::MessageParse("GameFinish without boolean isCorrect".to_string())
            })?;
        Ok(InboundMessage::GameFinish(GameResultEvent { is_correct }))
    }
}

/// Messages the page posts to the host or into the game frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundMessage {
    VideoCompleted,
    SendPointToUnity {
        point: u32,
    },
    GameFinished {
        #[serde(rename = "isCorrect")]
        is_correct: bool,
    },
}

impl OutboundMessage {
    pub fn to_json(&self) -> Result<String, BridgeError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<GameRewardEvent> for OutboundMessage {
    fn from(event: GameRewardEvent) -> Self {
        OutboundMessage::SendPointToUnity { point: event.points }
    }
}

impl From<GameResultEvent> for OutboundMessage {
    fn from(event: GameResultEvent) -> Self {
        OutboundMessage::GameFinished { is_correct: event.is_correct }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn start_playback_spellings() {
        for raw in [
            json!("start-playback"),
            json!("startPlayback"),
            json!({ "type": "startPlayback" }),
            json!(r#"{"type":"start-playback"}"#),
        ] {
            assert_eq!(InboundMessage::parse(&raw).unwrap(), InboundMessage::StartPlayback);
        }
    }

    #[test]
    fn unknown_tags_are_unrecognized() {
        for raw in [
            json!("pausePlayback"),
            json!(42),
            json!(null),
            json!({ "type": "videoCompleted" }),
            json!({ "name": "GameStart", "data": {} }),
            json!({ "foo": "bar" }),
        ] {
            assert_eq!(InboundMessage::parse(&raw).unwrap(), InboundMessage::Unrecognized);
        }
    }

    #[test]
    fn game_finish_extracts_flag() {
        let raw = json!({ "name": "GameFinish", "data": { "isCorrect": true } });
        assert_eq!(
            InboundMessage::parse(&raw).unwrap(),
            InboundMessage::GameFinish(GameResultEvent { is_correct: true })
        );

        let raw = json!(r#"{"name":"GameFinish","data":{"isCorrect":false}}"#);
        assert_eq!(
            InboundMessage::parse(&raw).unwrap(),
            InboundMessage::GameFinish(GameResultEvent { is_correct: false })
        );
    }

    #[test]
    fn malformed_game_finish_is_an_error() {
        for raw in [
            json!({ "name": "GameFinish" }),
            json!({ "name": "GameFinish", "data": { "isCorrect": "yes" } }),
            json!({ "name": 7 }),
            json!("{not json"),
        ] {
            assert!(matches!(
                InboundMessage::parse(&raw),
                Err(BridgeError::MessageParse(_))
            ));
        }
    }

    #[test]
    fn outbound_wire_format() {
        assert_eq!(
            OutboundMessage::VideoCompleted.to_json().unwrap(),
            r#"{"type":"videoCompleted"}"#
        );
        assert_eq!(
            OutboundMessage::from(GameRewardEvent { points: 30 }).to_json().unwrap(),
            r#"{"type":"sendPointToUnity","point":30}"#
        );
        assert_eq!(
            OutboundMessage::from(GameResultEvent { is_correct: true }).to_json().unwrap(),
            r#"{"type":"gameFinished","isCorrect":true}"#
        );
    }
}
