// Application state module
// Immutable per-process state shared by every connection

use crate::routing::EdgeRouter;
use crate::store::FsAssetStore;

use super::types::Config;

/// Application state
pub struct AppState {
    pub config: Config,
    pub router: EdgeRouter<FsAssetStore>,
}

impl AppState {
    /// Build the asset store and router described by `config`
    pub fn new(config: &Config) -> Self {
        let site = &config.site;
        let store = FsAssetStore::new(&site.root, site.index_files.clone(), site.html_fallback);
        let router = EdgeRouter::new(store, site.route_table(), site.policy)
            .with_pages_prefix(site.pages_prefix.clone())
            .with_default_document(site.default_document.clone());

        Self {
            config: config.clone(),
            router,
        }
    }

    pub fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
