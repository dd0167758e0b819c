//! Asset store module
//!
//! The router never touches the filesystem directly. It asks an [`AssetStore`]
//! for a path and gets back a document with a status code.
//!
//! - [`FsAssetStore`] serves a directory of pre-built site files
//! - [`MemoryAssetStore`] keeps assets in a map (tests, embedding)

mod fs;
mod memory;

pub use fs::FsAssetStore;
pub use memory::MemoryAssetStore;

use hyper::body::Bytes;
use hyper::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// A stored document as returned by a store fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub status: StatusCode,
    pub body: Bytes,
    pub content_type: &'static str,
}

impl Asset {
    /// A successfully fetched document
    pub fn ok(body: impl Into<Bytes>, content_type: &'static str) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.into(),
            content_type,
        }
    }

    /// The store has nothing under the requested key
    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: Bytes::from_static(b"404 Not Found"),
            content_type: "text/plain; charset=utf-8",
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }
}

/// Fetch failures. A missing key is not an error, see [`Asset::not_found`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read asset `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("path `{0}` resolves outside the asset root")]
    OutsideRoot(String),
}

/// Key-value access to stored assets, keyed by URL path (`/pages/about.html`)
#[allow(async_fn_in_trait)]
pub trait AssetStore {
    async fn fetch(&self, path: &str) -> Result<Asset, StoreError>;
}
