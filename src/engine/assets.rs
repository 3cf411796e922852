use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AssetStore, Error, Result};

const URL_SCHEME: &str = "blob://";

/// Sidecar metadata stored next to every payload.
#[derive(Debug, Serialize, Deserialize)]
struct AssetMeta {
    content_type: String,
    size: usize,
    uploaded_at: DateTime<Utc>,
}

/// Filesystem-backed implementation of [`AssetStore`].
///
/// Stands in for a remote blob service: callers hold only the opaque
/// `blob://` URL returned by [`AssetStore::put`]. Payloads are written with
/// a write-then-rename strategy so a crashed upload never leaves a
/// half-written file behind a URL.
pub struct FsAssetStore {
    dir: PathBuf,
}

impl FsAssetStore {
    /// Initializes an asset store in the specified directory.
    ///
    /// If the directory does not exist, it will be created.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        Ok(Self { dir })
    }

    /// Resolves a `blob://` URL to its payload and sidecar paths.
    ///
    /// Keys must stay inside the asset directory; URLs from any other
    /// scheme belong to a different asset store.
    fn resolve(&self, url: &str) -> Result<(PathBuf, PathBuf)> {
        let key = url
            .strip_prefix(URL_SCHEME)
            .ok_or_else(|| Error::Asset(format!("unsupported asset url: {}", url)))?;
        if key.is_empty() || key.contains('/') || key.contains('\\') || key.contains("..") {
            return Err(Error::Asset(format!("malformed asset key: {}", key)));
        }
        Ok((self.dir.join(key), self.dir.join(format!("{}.meta.json", key))))
    }
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[async_trait]
impl AssetStore for FsAssetStore {
    async fn put(&self, name: &str, content_type: &str, data: &[u8]) -> Result<String> {
        let key = format!("{}-{}", Uuid::new_v4(), sanitize_name(name));
        let path = self.dir.join(&key);
        let temp_path = self.dir.join(format!("{}.tmp", key));
        let meta_path = self.dir.join(format!("{}.meta.json", key));
        let meta_temp_path = self.dir.join(format!("{}.meta.json.tmp", key));
        let meta_bytes = serde_json::to_vec_pretty(&AssetMeta {
            content_type: content_type.to_string(),
            size: data.len(),
            uploaded_at: Utc::now(),
        })?;
        let data = data.to_vec();

        tokio::task::spawn_blocking(move || -> Result<()> {
            fs::write(&temp_path, &data)?;
            fs::rename(&temp_path, &path)?;
            fs::write(&meta_temp_path, &meta_bytes)?;
            fs::rename(&meta_temp_path, &meta_path)?;
            Ok(())
        })
        .await
        .map_err(|e| Error::Internal(e.to_string()))??;

        Ok(format!("{}{}", URL_SCHEME, key))
    }

    async fn delete(&self, url: &str) -> Result<()> {
        let (path, meta_path) = self.resolve(url)?;
        let url = url.to_string();

        tokio::task::spawn_blocking(move || -> Result<()> {
            if !path.exists() {
                return Err(Error::Asset(format!("no asset behind {}", url)));
            }
            fs::remove_file(&path)?;
            if meta_path.exists() {
                fs::remove_file(&meta_path)?;
            }
            Ok(())
        })
        .await
        .map_err(|e| Error::Internal(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_put_then_delete() {
        let dir = tempdir().unwrap();
        let assets = FsAssetStore::new(dir.path()).unwrap();

        let url = assets.put("lamp.png", "image/png", b"payload").await.unwrap();
        assert!(url.starts_with(URL_SCHEME));

        let (path, meta_path) = assets.resolve(&url).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"payload");
        let meta: AssetMeta = serde_json::from_slice(&fs::read(&meta_path).unwrap()).unwrap();
        assert_eq!(meta.content_type, "image/png");
        assert_eq!(meta.size, 7);

        assets.delete(&url).await.unwrap();
        assert!(!path.exists());
        assert!(!meta_path.exists());
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let dir = tempdir().unwrap();
        let assets = FsAssetStore::new(dir.path()).unwrap();

        assets.put("mug.jpg", "image/jpeg", b"bytes").await.unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_asset_fails() {
        let dir = tempdir().unwrap();
        let assets = FsAssetStore::new(dir.path()).unwrap();

        let res = assets.delete("blob://does-not-exist.png").await;
        assert!(matches!(res, Err(Error::Asset(_))));
    }

    #[tokio::test]
    async fn test_delete_rejects_foreign_and_malformed_urls() {
        let dir = tempdir().unwrap();
        let assets = FsAssetStore::new(dir.path()).unwrap();

        assert!(matches!(
            assets.delete("https://example.com/a.png").await,
            Err(Error::Asset(_))
        ));
        assert!(matches!(
            assets.delete("blob://../escape").await,
            Err(Error::Asset(_))
        ));
    }

    #[test]
    fn test_sanitize_name_keeps_safe_chars_only() {
        assert_eq!(sanitize_name("desk lamp (1).png"), "desk_lamp__1_.png");
        assert_eq!(sanitize_name("simple.webp"), "simple.webp");
    }
}
