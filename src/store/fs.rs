//! Filesystem-backed asset store
//!
//! Serves a directory of pre-built site files. Request paths are
//! percent-decoded before lookup. Lookups never leave the root:
//! `..` segments are rejected up front and the resolved file is canonicalized
//! and checked against the canonical root (symlinks included).

use super::{Asset, AssetStore, StoreError};
use crate::http::mime;
use crate::logger;
use percent_encoding::percent_decode_str;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, Clone)]
pub struct FsAssetStore {
    root: PathBuf,
    index_files: Vec<String>,
    html_fallback: bool,
}

impl FsAssetStore {
    /// * `root` - Directory holding the site files
    /// * `index_files` - Files tried, in order, when a path names a directory
    /// * `html_fallback` - Serve `<path>.html` for an extensionless path with no exact match
    pub fn new(root: impl Into<PathBuf>, index_files: Vec<String>, html_fallback: bool) -> Self {
        Self {
            root: root.into(),
            index_files,
            html_fallback,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a URL path to an existing file under the root
    ///
    /// Returns `Ok(None)` when nothing matches.
    async fn resolve(&self, path: &str) -> Result<Option<PathBuf>, StoreError> {
        // Decode before the segment check so `%2e%2e` is caught too
        let Ok(decoded) = percent_decode_str(path).decode_utf8() else {
            return Ok(None);
        };
        let relative = decoded.trim_start_matches('/');
        if relative.contains('\0') {
            return Ok(None);
        }
        if relative.split('/').any(|segment| segment == "..") {
            return Err(StoreError::OutsideRoot(path.to_string()));
        }

        let root_canonical = fs::canonicalize(&self.root)
            .await
            .map_err(|source| StoreError::Io {
                path: self.root.clone(),
                source,
            })?;

        let mut candidate = self.root.join(relative);

        if relative.is_empty() || relative.ends_with('/') || is_dir(&candidate).await {
            let mut index = None;
            for index_file in &self.index_files {
                let index_path = candidate.join(index_file);
                if is_file(&index_path).await {
                    index = Some(index_path);
                    break;
                }
            }
            match index {
                Some(index_path) => candidate = index_path,
                None => return Ok(None),
            }
        } else if self.html_fallback
            && candidate.extension().is_none()
            && !is_file(&candidate).await
        {
            let mut with_html = OsString::from(candidate.as_os_str());
            with_html.push(".html");
            candidate = PathBuf::from(with_html);
        }

        if !is_file(&candidate).await {
            return Ok(None);
        }

        let canonical = fs::canonicalize(&candidate)
            .await
            .map_err(|source| StoreError::Io {
                path: candidate.clone(),
                source,
            })?;
        if !canonical.starts_with(&root_canonical) {
            logger::log_warning(&format!(
                "Path traversal attempt blocked: {} -> {}",
                path,
                canonical.display()
            ));
            return Err(StoreError::OutsideRoot(path.to_string()));
        }

        Ok(Some(canonical))
    }
}

impl AssetStore for FsAssetStore {
    async fn fetch(&self, path: &str) -> Result<Asset, StoreError> {
        let Some(file_path) = self.resolve(path).await? else {
            return Ok(Asset::not_found());
        };

        let content = fs::read(&file_path)
            .await
            .map_err(|source| StoreError::Io {
                path: file_path.clone(),
                source,
            })?;
        let content_type = mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));

        Ok(Asset::ok(content, content_type))
    }
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_file())
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::StatusCode;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>home</h1>").unwrap();
        std::fs::write(dir.path().join("styles.css"), "body{}").unwrap();
        std::fs::create_dir_all(dir.path().join("pages/events")).unwrap();
        std::fs::write(dir.path().join("pages/about.html"), "about").unwrap();
        std::fs::write(dir.path().join("pages/events/index.html"), "events").unwrap();
        dir
    }

    fn store(dir: &TempDir, html_fallback: bool) -> FsAssetStore {
        FsAssetStore::new(dir.path(), vec!["index.html".to_string()], html_fallback)
    }

    #[tokio::test]
    async fn test_fetch_existing_file() {
        let dir = site();
        let asset = store(&dir, true).fetch("/styles.css").await.unwrap();
        assert_eq!(asset.status, StatusCode::OK);
        assert_eq!(asset.content_type, "text/css; charset=utf-8");
        assert_eq!(&asset.body[..], b"body{}");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = site();
        let asset = store(&dir, true).fetch("/missing.png").await.unwrap();
        assert!(asset.is_not_found());
    }

    #[tokio::test]
    async fn test_directory_uses_index_file() {
        let dir = site();
        let store = store(&dir, true);

        let asset = store.fetch("/pages/events/").await.unwrap();
        assert_eq!(&asset.body[..], b"events");

        let asset = store.fetch("/pages/events").await.unwrap();
        assert_eq!(&asset.body[..], b"events");

        let asset = store.fetch("/").await.unwrap();
        assert_eq!(&asset.body[..], b"<h1>home</h1>");
    }

    #[tokio::test]
    async fn test_directory_without_index_is_not_found() {
        let dir = site();
        let asset = store(&dir, true).fetch("/pages/").await.unwrap();
        assert!(asset.is_not_found());
    }

    #[tokio::test]
    async fn test_html_fallback() {
        let dir = site();

        let asset = store(&dir, true).fetch("/pages/about").await.unwrap();
        assert_eq!(asset.status, StatusCode::OK);
        assert_eq!(asset.content_type, "text/html; charset=utf-8");

        let asset = store(&dir, false).fetch("/pages/about").await.unwrap();
        assert!(asset.is_not_found());
    }

    #[tokio::test]
    async fn test_parent_segments_rejected() {
        let dir = site();
        let result = store(&dir, true).fetch("/pages/../../etc/passwd").await;
        assert!(matches!(result, Err(StoreError::OutsideRoot(_))));
    }

    #[tokio::test]
    async fn test_percent_encoded_names() {
        let dir = site();
        std::fs::write(dir.path().join("pages/rules and terms.html"), "rules").unwrap();
        std::fs::write(dir.path().join("pages/café.html"), "menu").unwrap();
        let store = store(&dir, true);

        let asset = store.fetch("/pages/rules%20and%20terms.html").await.unwrap();
        assert_eq!(&asset.body[..], b"rules");

        let asset = store.fetch("/pages/caf%C3%A9.html").await.unwrap();
        assert_eq!(&asset.body[..], b"menu");

        let asset = store.fetch("/pages/rules%20and%20terms").await.unwrap();
        assert_eq!(&asset.body[..], b"rules");
    }

    #[tokio::test]
    async fn test_encoded_parent_segments_rejected() {
        let dir = site();
        let store = store(&dir, true);
        for path in ["/pages/%2e%2e/%2E%2E/etc/passwd", "/%2e%2e%2fsecret.txt"] {
            let result = store.fetch(path).await;
            assert!(
                matches!(result, Err(StoreError::OutsideRoot(_))),
                "{path} was not rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_not_found() {
        let dir = site();
        let asset = store(&dir, true).fetch("/pages/%FF.html").await.unwrap();
        assert!(asset.is_not_found());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_outside_root_rejected() {
        let dir = site();
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), "secret").unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("secret.txt"),
            dir.path().join("pages/leak.txt"),
        )
        .unwrap();

        let result = store(&dir, true).fetch("/pages/leak.txt").await;
        assert!(matches!(result, Err(StoreError::OutsideRoot(_))));
    }

    #[tokio::test]
    async fn test_missing_root_is_error() {
        let store = FsAssetStore::new("/nonexistent/site-edge-root", vec![], false);
        let result = store.fetch("/index.html").await;
        assert!(matches!(result, Err(StoreError::Io { .. })));
    }
}
