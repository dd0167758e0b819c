//! Routing policy
//!
//! Pure path decisions, no I/O. The legacy table is always consulted first;
//! the policy only matters for paths the table does not know.

use super::table::RouteTable;
use serde::{Deserialize, Serialize};

/// How unknown top-level paths are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RoutingPolicy {
    /// Serve the path as-is (legacy routes are rewritten internally)
    Rewrite,
    /// Send single-segment paths to `<pages_prefix>/<segment>` with a 301
    #[default]
    Redirect,
}

/// Outcome of routing a path, before the store is consulted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Serve the asset stored under this path
    Serve(String),
    /// Answer with a permanent redirect to this location
    Redirect(String),
}

impl RoutingPolicy {
    pub fn decide(self, path: &str, table: &RouteTable, pages_prefix: &str) -> RouteDecision {
        if let Some(canonical) = table.lookup(path) {
            return RouteDecision::Serve(canonical.to_string());
        }

        if self == Self::Redirect {
            if let Some(location) = redirect_target(path, pages_prefix) {
                return RouteDecision::Redirect(location);
            }
        }

        RouteDecision::Serve(path.to_string())
    }
}

/// Canonical `/pages/<segment>` location for a bare top-level path
///
/// Only paths with exactly one segment qualify. The pages directory itself
/// and file-like segments (`/styles.css`, `/index.html`) are left alone.
/// An empty prefix never redirects: the target would be the path itself.
pub fn redirect_target(path: &str, pages_prefix: &str) -> Option<String> {
    let prefix = pages_prefix.trim_matches('/');
    let segment = path.trim_matches('/');

    if segment.is_empty() || segment.contains('/') || segment.contains('.') {
        return None;
    }
    if prefix.is_empty() || segment == prefix {
        return None;
    }

    let location = format!("/{prefix}/{segment}");
    (location != path).then_some(location)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        RouteTable::from_entries([("/membership", "/pages/membership-form.html")])
    }

    #[test]
    fn test_redirect_single_segment() {
        assert_eq!(
            redirect_target("/about", "/pages"),
            Some("/pages/about".to_string())
        );
        assert_eq!(
            redirect_target("/about/", "/pages"),
            Some("/pages/about".to_string())
        );
    }

    #[test]
    fn test_no_redirect_for_nested_or_pages() {
        assert_eq!(redirect_target("/pages/about", "/pages"), None);
        assert_eq!(redirect_target("/pages/x/y", "/pages"), None);
        assert_eq!(redirect_target("/docs/guide", "/pages"), None);
        assert_eq!(redirect_target("/pages", "/pages"), None);
        assert_eq!(redirect_target("/pages/", "/pages"), None);
    }

    #[test]
    fn test_no_redirect_for_root_or_files() {
        assert_eq!(redirect_target("/", "/pages"), None);
        assert_eq!(redirect_target("", "/pages"), None);
        assert_eq!(redirect_target("/index.html", "/pages"), None);
        assert_eq!(redirect_target("/favicon.ico", "/pages"), None);
    }

    #[test]
    fn test_never_redirects_to_itself() {
        assert_eq!(redirect_target("/about", "/"), None);
        assert_eq!(redirect_target("/about", ""), None);
        for path in ["/about", "/about/", "/x"] {
            if let Some(location) = redirect_target(path, "/pages") {
                assert_ne!(location, path);
            }
        }
    }

    #[test]
    fn test_decide_legacy_route_wins() {
        for policy in [RoutingPolicy::Rewrite, RoutingPolicy::Redirect] {
            assert_eq!(
                policy.decide("/membership", &table(), "/pages"),
                RouteDecision::Serve("/pages/membership-form.html".to_string())
            );
        }
    }

    #[test]
    fn test_decide_rewrite_serves_unknown_path() {
        assert_eq!(
            RoutingPolicy::Rewrite.decide("/about", &table(), "/pages"),
            RouteDecision::Serve("/about".to_string())
        );
    }

    #[test]
    fn test_decide_redirect() {
        assert_eq!(
            RoutingPolicy::Redirect.decide("/about", &table(), "/pages"),
            RouteDecision::Redirect("/pages/about".to_string())
        );
        assert_eq!(
            RoutingPolicy::Redirect.decide("/pages/about", &table(), "/pages"),
            RouteDecision::Serve("/pages/about".to_string())
        );
    }

    #[test]
    fn test_decide_is_idempotent() {
        let table = table();
        for path in ["/", "/about", "/membership", "/pages/x/y", "/styles.css"] {
            let first = RoutingPolicy::Redirect.decide(path, &table, "/pages");
            let second = RoutingPolicy::Redirect.decide(path, &table, "/pages");
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_policy_deserialize() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: RoutingPolicy,
        }
        let w: Wrapper = serde_json::from_str(r#"{"policy":"rewrite"}"#).unwrap();
        assert_eq!(w.policy, RoutingPolicy::Rewrite);
        assert_eq!(RoutingPolicy::default(), RoutingPolicy::Redirect);
    }
}
