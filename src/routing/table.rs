//! Legacy route table
//!
//! Maps old public URLs to the canonical asset paths they moved to.
//! Built once at startup and never modified.

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, String>,
}

impl RouteTable {
    /// Build the table from `(legacy, canonical)` pairs
    ///
    /// Later entries win over earlier ones with the same legacy path.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let routes = entries
            .into_iter()
            .map(|(legacy, canonical)| (normalize(legacy.as_ref()).to_string(), canonical.into()))
            .collect();
        Self { routes }
    }

    /// Canonical path for `path`, if it is a legacy route
    pub fn lookup(&self, path: &str) -> Option<&str> {
        self.routes.get(normalize(path)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Drop a single trailing slash so `/membership/` and `/membership` agree
fn normalize(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        RouteTable::from_entries([
            ("/membership", "/pages/membership-form.html"),
            ("/tenant/", "/pages/tenant-form.html"),
        ])
    }

    #[test]
    fn test_lookup_exact() {
        let table = table();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.lookup("/membership"),
            Some("/pages/membership-form.html")
        );
        assert_eq!(table.lookup("/unknown"), None);
    }

    #[test]
    fn test_lookup_ignores_trailing_slash() {
        let table = table();
        assert_eq!(
            table.lookup("/membership/"),
            Some("/pages/membership-form.html")
        );
        assert_eq!(table.lookup("/tenant"), Some("/pages/tenant-form.html"));
    }

    #[test]
    fn test_lookup_is_not_prefix_match() {
        let table = table();
        assert_eq!(table.lookup("/membership/extra"), None);
        assert_eq!(table.lookup("/member"), None);
    }

    #[test]
    fn test_root_is_kept() {
        let table = RouteTable::from_entries([("/", "/home.html")]);
        assert_eq!(table.lookup("/"), Some("/home.html"));
    }
}
