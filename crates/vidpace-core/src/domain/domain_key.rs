//! Per-site key used to look up stored speeds.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Normalized host identifier: lowercase, one leading `www.` removed.
///
/// Path, query and port are never part of the key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainKey(String);

impl DomainKey {
    /// Normalize a bare hostname.
    ///
    /// Returns `None` for an empty host.
    pub fn from_host(host: &str) -> Option<Self> {
        let lowered = host.trim().to_ascii_lowercase();
        let stripped = lowered.strip_prefix("www.").unwrap_or(&lowered);
        if stripped.is_empty() {
            return None;
        }
        Some(Self(stripped.to_string()))
    }

    /// Derive the key from a page URL.
    ///
    /// Returns `None` for unparsable URLs and URLs without a host
    /// (`about:blank`, `data:` documents, ...).
    pub fn from_url(url: &str) -> Option<Self> {
        let parsed = Url::parse(url).ok()?;
        Self::from_host(parsed.host_str()?)
    }

    /// The normalized host string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the host contains `marker` (case-insensitive).
    pub fn contains_marker(&self, marker: &str) -> bool {
        !marker.is_empty() && self.0.contains(&marker.to_ascii_lowercase())
    }
}

impl fmt::Display for DomainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_url_strips_www_and_path() {
        let key = DomainKey::from_url("https://www.Example.com/watch?v=1").unwrap();
        assert_eq!(key.as_str(), "example.com");
    }

    #[test]
    fn test_from_url_ignores_port() {
        let key = DomainKey::from_url("http://video.example:8080/a").unwrap();
        assert_eq!(key.as_str(), "video.example");
    }

    #[test]
    fn test_only_leading_www_is_stripped() {
        let key = DomainKey::from_host("cdn.www.example.com").unwrap();
        assert_eq!(key.as_str(), "cdn.www.example.com");
    }

    #[test]
    fn test_missing_host_yields_none() {
        assert!(DomainKey::from_url("about:blank").is_none());
        assert!(DomainKey::from_url("not a url").is_none());
        assert!(DomainKey::from_host("   ").is_none());
        assert!(DomainKey::from_host("www.").is_none());
    }

    #[test]
    fn test_contains_marker() {
        let key = DomainKey::from_host("beta.crunchyroll.com").unwrap();
        assert!(key.contains_marker("crunchyroll.com"));
        assert!(key.contains_marker("CrunchyRoll.com"));
        assert!(!key.contains_marker("youtube.com"));
        assert!(!key.contains_marker(""));
    }
}
