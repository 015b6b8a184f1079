use thiserror::Error;

/// Failures the bridges can run into.
///
/// None of these are fatal: each one is caught where it happens and turned
/// into a log line (or, for loader failures, a user-facing alert).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    #[error("invalid video url or id: {0:?}")]
    InvalidInput(String),

    #[error("failed to load script: {src}")]
    LoaderFailure { src: String },

    #[error("player is not ready to accept commands")]
    CapabilityNotReady,

    #[error("malformed message: {0}")]
    MessageParse(String),

    #[error("player call failed: {0}")]
    PlayerCall(String),

    #[error("failed to post message: {0}")]
    Post(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("page element unavailable: {0}")]
    Dom(String),
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::MessageParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_failure_names_the_script() {
        let err = BridgeError::LoaderFailure {
            src: "/unity/Build/unity_game.loader.js".to_string(),
        };
        assert!(err.to_string().contains("unity_game.loader.js"));
    }

    #[test]
    fn dom_failures_are_not_input_errors() {
        let err = BridgeError::Dom("no <head>".to_string());
        assert_eq!(err.to_string(), "page element unavailable: no <head>");
        assert!(!matches!(err, BridgeError::InvalidInput(_)));
    }

    #[test]
    fn serde_errors_become_parse_failures() {
        let err: BridgeError = serde_json::from_str::<u32>("{").unwrap_err().into();
        assert!(matches!(err, BridgeError::MessageParse(_)));
    }
}
