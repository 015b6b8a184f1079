use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::BridgeError;

/// URL shapes tried in order. Each captures the 11-character id.
static URL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/shorts/)([A-Za-z0-9_-]{11})",
        r"youtube\.com/embed/([A-Za-z0-9_-]{11})",
        r"youtube\.com/v/([A-Za-z0-9_-]{11})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("video url pattern should compile"))
    .collect()
});

static BARE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("bare id pattern should compile"));

/// A canonical 11-character video identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    /// Parse a URL or bare id, reporting invalid input as an error.
    pub fn parse(input: &str) -> Result<Self, BridgeError> {
        extract_video_id(input).ok_or_else(|| BridgeError::InvalidInput(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract a video id from a watch, short-link, shorts, embed or legacy
/// `/v/` URL, or accept a bare id. Returns `None` when nothing matches.
pub fn extract_video_id(input: &str) -> Option<VideoId> {
    for pattern in URL_PATTERNS.iter() {
        if let Some(id) = pattern.captures(input).and_then(|c| c.get(1)) {
            return Some(VideoId(id.as_str().to_string()));
        }
    }

    if BARE_ID.is_match(input) {
        return Some(VideoId(input.to_string()));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(input: &str) -> Option<String> {
        extract_video_id(input).map(|v| v.as_str().to_string())
    }

    #[test]
    fn short_link() {
        assert_eq!(id("https://youtu.be/dQw4w9WgXcQ").as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn shorts_url() {
        assert_eq!(
            id("https://www.youtube.com/shorts/z-29NKtciRg").as_deref(),
            Some("z-29NKtciRg")
        );
    }

    #[test]
    fn watch_url_with_extra_params() {
        assert_eq!(
            id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn embed_and_legacy_urls() {
        assert_eq!(
            id("https://www.youtube.com/embed/dQw4w9WgXcQ?rel=0").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(id("http://youtube.com/v/dQw4w9WgXcQ").as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn bare_id() {
        assert_eq!(id("z-29NKtciRg").as_deref(), Some("z-29NKtciRg"));
    }

    #[test]
    fn padded_bare_id_is_not_an_id() {
        assert_eq!(id("  z-29NKtciRg\n"), None);
        assert_eq!(id(" z-29NKtciRg"), None);
    }

    #[test]
    fn rejects_everything_else() {
        assert_eq!(id("not a url"), None);
        assert_eq!(id(""), None);
        assert_eq!(id("z-29NKtciR"), None);
        assert_eq!(id("z-29NKtciRgX"), None);
        assert_eq!(id("https://vimeo.com/123456789"), None);
        assert_eq!(id("https://youtu.be/short"), None);
    }

    #[test]
    fn parse_reports_invalid_input() {
        let err = VideoId::parse("not a url").unwrap_err();
        assert_eq!(err, BridgeError::InvalidInput("not a url".to_string()));
    }
}
