use serde::{Deserialize, Serialize};

/// Identifies one mounted view (player or game surface).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(pub u32);

/// Reward points posted into the game frame once it has settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRewardEvent {
    pub points: u32,
}

/// Outcome reported by the game frame when a round finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResultEvent {
    pub is_correct: bool,
}
