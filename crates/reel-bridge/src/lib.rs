pub mod api;
pub mod config;
pub mod error;
pub mod game;
pub mod player;
pub mod protocol;
pub mod relay;
pub mod runner;
pub mod schedule;
pub mod video;

// Re-export key types at crate root for convenience
pub use api::hooks::{BridgeHooks, DefaultHooks};
pub use api::types::{GameResultEvent, GameRewardEvent, ViewId};
pub use config::{BridgeConfig, YOUTUBE_IFRAME_API_URL};
pub use error::BridgeError;
pub use game::banner::{Banner, BannerKind};
pub use game::bridge::{BannerId, FrameSink, GameBridge, GameInstance, GameState, GameTimerOutcome};
pub use game::build::{UnityBuild, UnityInstanceConfig};
pub use game::device::DeviceClass;
pub use player::bridge::{PlaybackBridge, PlaybackState, StartOutcome};
pub use player::handle::{PlayerHandle, PlayerState};
pub use player::loader::{LibraryLoader, LoadState, ScriptSource};
pub use player::options::{PlayerOptions, PlayerVars};
pub use player::session::PlaybackSession;
pub use protocol::message::{InboundMessage, OutboundMessage, RawMessage};
pub use protocol::origin::OriginPolicy;
pub use relay::host::{HostRelay, HostSink, RecordingSink};
pub use runner::{BridgeRunner, TimerOutcome, VideoMount};
pub use schedule::manual::ManualScheduler;
pub use schedule::timer::{Scheduler, TaskId, TimerSet};
pub use video::id::{extract_video_id, VideoId};
