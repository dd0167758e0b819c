//! Edge router
//!
//! `handle(path)` runs the whole decision for one request:
//! 1. Legacy rewrite or canonical redirect (see [`RoutingPolicy`])
//! 2. Root and empty paths become the default document
//! 3. Store fetch
//! 4. A miss retries once against the default document
//! 5. Store errors degrade to the default document
//!
//! Nothing here fails. The worst case is a locally built 404 when the
//! default document itself cannot be fetched.

use super::policy::{RouteDecision, RoutingPolicy};
use super::table::RouteTable;
use crate::logger;
use crate::store::{Asset, AssetStore};

pub const DEFAULT_DOCUMENT: &str = "/index.html";
pub const DEFAULT_PAGES_PREFIX: &str = "/pages";

/// Result of routing one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
    Asset {
        /// Store key the asset was fetched from
        path: String,
        asset: Asset,
        /// True when the default document replaced a missing or failed asset
        fallback: bool,
    },
    Redirect {
        location: String,
    },
}

pub struct EdgeRouter<S> {
    store: S,
    table: RouteTable,
    policy: RoutingPolicy,
    pages_prefix: String,
    default_document: String,
}

impl<S: AssetStore> EdgeRouter<S> {
    pub fn new(store: S, table: RouteTable, policy: RoutingPolicy) -> Self {
        Self {
            store,
            table,
            policy,
            pages_prefix: DEFAULT_PAGES_PREFIX.to_string(),
            default_document: DEFAULT_DOCUMENT.to_string(),
        }
    }

    #[must_use]
    pub fn with_pages_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.pages_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_default_document(mut self, path: impl Into<String>) -> Self {
        self.default_document = path.into();
        self
    }

    pub const fn policy(&self) -> RoutingPolicy {
        self.policy
    }

    pub const fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn default_document(&self) -> &str {
        &self.default_document
    }

    /// Routing decision for `path` without touching the store
    pub fn decide(&self, path: &str) -> RouteDecision {
        let path = if path.is_empty() { "/" } else { path };
        match self.policy.decide(path, &self.table, &self.pages_prefix) {
            RouteDecision::Serve(target) if target.is_empty() || target == "/" => {
                RouteDecision::Serve(self.default_document.clone())
            }
            decision => decision,
        }
    }

    /// Route a request path (and its query string) to an asset or a redirect
    pub async fn handle(&self, path: &str, query: Option<&str>) -> Routed {
        match self.decide(path) {
            RouteDecision::Redirect(mut location) => {
                if let Some(query) = query.filter(|q| !q.is_empty()) {
                    location.push('?');
                    location.push_str(query);
                }
                Routed::Redirect { location }
            }
            RouteDecision::Serve(target) => self.serve(target).await,
        }
    }

    async fn serve(&self, path: String) -> Routed {
        match self.store.fetch(&path).await {
            Ok(asset) if asset.is_not_found() && path != self.default_document => {
                logger::log_debug(&format!(
                    "Asset not found: {path}, serving {}",
                    self.default_document
                ));
                self.serve_default().await
            }
            Ok(asset) => Routed::Asset {
                path,
                asset,
                fallback: false,
            },
            Err(e) => {
                logger::log_warning(&format!(
                    "Asset fetch failed for '{path}': {e}, serving {}",
                    self.default_document
                ));
                self.serve_default().await
            }
        }
    }

    async fn serve_default(&self) -> Routed {
        let asset = match self.store.fetch(&self.default_document).await {
            Ok(asset) => asset,
            Err(e) => {
                logger::log_error(&format!(
                    "Default document '{}' unavailable: {e}",
                    self.default_document
                ));
                Asset::not_found()
            }
        };

        Routed::Asset {
            path: self.default_document.clone(),
            asset,
            fallback: true,
        }
    }
}
