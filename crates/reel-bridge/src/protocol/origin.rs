/// Which origins may talk to the page, and where outbound messages go.
///
/// Outbound messages never use the `*` wildcard: they target the first
/// allow-listed origin, or the page's own origin when the list is empty.
/// The opaque origin `"null"` is only accepted when listed explicitly.
/// Origin reported by sandboxed frames and `data:` documents.
const OPAQUE: &str = "null";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginPolicy {
    own_origin: String,
    allowed: Vec<String>,
    native_host: bool,
}

impl OriginPolicy {
    pub fn new(own_origin: &str, allowed: impl IntoIterator<Item = String>) -> Self {
        Self {
            own_origin: normalize(own_origin),
            allowed: allowed
                .into_iter()
                .map(|o| normalize(&o))
                .filter(|o| !o.is_empty() && o != "*")
                .collect(),
            native_host: true,
        }
    }

    /// Whether the empty origin used by native shell injection is accepted.
    pub fn with_native_host(mut self, accept: bool) -> Self {
        self.native_host = accept;
        self
    }

    pub fn permits(&self, origin: &str) -> bool {
        let origin = normalize(origin);
        if origin.is_empty() {
            return self.native_host;
        }
        origin == self.own_origin || self.allowed.iter().any(|o| *o == origin)
    }

    /// Target origin for `postMessage` to the host.
    pub fn host_target(&self) -> &str {
        self.allowed
            .iter()
            .find(|o| o.as_str() != OPAQUE)
            .map(String::as_str)
            .unwrap_or(self.own_origin.as_str())
    }

    pub fn own_origin(&self) -> &str {
        &self.own_origin
    }
}

fn normalize(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_origin_always_allowed() {
        let policy = OriginPolicy::new("https://app.example", Vec::new());
        assert!(policy.permits("https://app.example"));
        assert!(policy.permits("https://APP.example/"));
        assert!(!policy.permits("https://evil.example"));
    }

    #[test]
    fn allow_list_is_exact() {
        let policy = OriginPolicy::new(
            "https://app.example",
            vec!["https://host.example".to_string()],
        );
        assert!(policy.permits("https://host.example"));
        assert!(!policy.permits("https://host.example.evil"));
        assert!(!policy.permits("http://host.example"));
    }

    #[test]
    fn wildcard_entries_are_dropped() {
        let policy = OriginPolicy::new("https://app.example", vec!["*".to_string()]);
        assert!(!policy.permits("https://evil.example"));
        assert_eq!(policy.host_target(), "https://app.example");
    }

    #[test]
    fn native_host_origin() {
        let policy = OriginPolicy::new("https://app.example", Vec::new());
        assert!(policy.permits(""));
        assert!(!policy.permits("null"));
        let strict = policy.with_native_host(false);
        assert!(!strict.permits(""));
        assert!(!strict.permits("null"));
    }

    #[test]
    fn opaque_origin_needs_explicit_listing() {
        let policy = OriginPolicy::new(
            "https://app.example",
            vec!["null".to_string(), "https://host.example".to_string()],
        );
        assert!(policy.permits("null"));
        assert_eq!(policy.host_target(), "https://host.example");
    }

    #[test]
    fn host_target_prefers_allow_list() {
        let policy = OriginPolicy::new(
            "https://app.example",
            vec!["https://host.example/".to_string(), "https://other.example".to_string()],
        );
        assert_eq!(policy.host_target(), "https://host.example");
    }
}
