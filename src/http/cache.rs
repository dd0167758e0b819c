//! HTTP cache control module
//!
//! `ETag` generation, `If-None-Match` handling and `Cache-Control` policies.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Quoted `ETag` for a body, e.g. `"abc123def"`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    let v = hasher.finish();
    format!("\"{v:x}\"")
}

/// Whether the client's `If-None-Match` covers `etag` (should answer 304)
///
/// Accepts a single tag, a comma-separated list, or `*`.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag
            .split(',')
            .map(str::trim)
            .any(|e| e == etag || e == "*" || e.strip_prefix("W/") == Some(etag))
    })
}

/// `Cache-Control` policy attached to a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Shared caches may keep the response for `max-age` seconds
    Public(u32),
    /// Revalidate on every use. Default-document fallbacks use this so the
    /// index page is never cached under an unrelated URL.
    NoCache,
}

impl CachePolicy {
    pub fn to_header_value(self) -> String {
        match self {
            Self::Public(max_age) => format!("public, max-age={max_age}"),
            Self::NoCache => "no-cache".to_string(),
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::Public(3600)
    }
}
