use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Error,
    Warning,
    Info,
}

impl BannerKind {
    /// Parse the `type` argument of the runtime's `showBanner(msg, type)`.
    pub fn from_type(kind: &str) -> Self {
        match kind {
            "error" => BannerKind::Error,
            "warning" => BannerKind::Warning,
            _ => BannerKind::Info,
        }
    }

    /// Inline style for the banner element.
    pub fn style(self) -> &'static str {
        match self {
            BannerKind::Error => "background: red; padding: 10px;",
            BannerKind::Warning => "background: yellow; padding: 10px;",
            BannerKind::Info => "",
        }
    }
}

/// A diagnostic banner raised by the game runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub message: String,
    pub kind: BannerKind,
}

impl Banner {
    pub fn new(message: impl Into<String>, kind: &str) -> Self {
        Self {
            message: message.into(),
            kind: BannerKind::from_type(kind),
        }
    }

    /// Warnings go away on their own; errors and info stay.
    pub fn auto_dismiss(&self, after: Duration) -> Option<Duration> {
        (self.kind == BannerKind::Warning).then_some(after)
    }
}
