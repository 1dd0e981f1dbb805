use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, instrument, warn};

use crate::domain::error::PhotoCacheError;
use crate::domain::ports::PhotoCache;
use crate::infra::http::TracedClient;

const PHOTO_EXTENSION: &str = "jpg";

/// Photo cache backed by a flat directory of `<sha256-hex>.jpg` files.
pub struct FsPhotoCache {
    dir: PathBuf,
    http: TracedClient,
    tmp_seq: AtomicU64,
}

impl FsPhotoCache {
    pub fn new(dir: impl Into<PathBuf>, http: TracedClient) -> Self {
        Self {
            dir: dir.into(),
            http,
            tmp_seq: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for_key(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{PHOTO_EXTENSION}"))
    }

    async fn download(&self, url: &str, token: &str, target: &Path) -> Result<bool, io::Error> {
        let response = match self.http.get_bearer(url, token, &[]).await {
            Ok(r) => r,
            Err(e) => {
                debug!(error = %e, "photo request failed");
                return Ok(false);
            }
        };
        if !response.status().is_success() {
            debug!(status = %response.status(), "photo request rejected");
            return Ok(false);
        }
        let bytes = match response.bytes().await {
            Ok(b) => b,
            Err(e) => {
                debug!(error = %e, "photo body read failed");
                return Ok(false);
            }
        };

        tokio::fs::create_dir_all(&self.dir).await?;
        // Readers see either no file or a complete one.
        let seq = self.tmp_seq.fetch_add(1, Ordering::Relaxed);
        let tmp = target.with_extension(format!("{PHOTO_EXTENSION}.{seq}.part"));
        if let Err(e) = tokio::fs::write(&tmp, &bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e);
        }
        if let Err(e) = tokio::fs::rename(&tmp, target).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e);
        }
        Ok(true)
    }

    /// Delete every regular file in the cache dir for which `doomed` holds.
    async fn remove_where<F>(&self, doomed: F) -> Result<usize, PhotoCacheError>
    where
        F: Fn(&Path) -> bool + Send,
    {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(PhotoCacheError::io(&self.dir, e)),
        };

        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PhotoCacheError::io(&self.dir, e))?
        {
            let path = entry.path();
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if !is_file || !doomed(&path) {
                continue;
            }
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(PhotoCacheError::io(path, e)),
            }
        }
        Ok(removed)
    }
}

/// Lowercase hex SHA-256 of the identifier's UTF-8 bytes.
pub fn photo_key(identifier: &str) -> String {
    hex::encode(Sha256::digest(identifier.as_bytes()))
}

/// Key of a finished `<key>.jpg` entry. Partial downloads and foreign
/// names have none.
fn key_of(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    let key = name.strip_suffix(PHOTO_EXTENSION)?.strip_suffix('.')?;
    (!key.is_empty() && !key.contains('.')).then_some(key)
}

#[async_trait]
impl PhotoCache for FsPhotoCache {
    fn key_for(&self, identifier: &str) -> String {
        photo_key(identifier)
    }

    #[instrument(name = "birthday_sync.photos.fetch", skip_all)]
    async fn fetch_or_populate(
        &self,
        identifier: &str,
        url: &str,
        token: Option<&str>,
    ) -> Option<PathBuf> {
        let target = self.path_for_key(&self.key_for(identifier));
        if tokio::fs::try_exists(&target).await.unwrap_or(false) {
            return Some(target);
        }

        let token = token.filter(|t| !t.trim().is_empty())?;
        match self.download(url, token, &target).await {
            Ok(true) => Some(target),
            Ok(false) => None,
            Err(e) => {
                warn!(error = %e, dir = %self.dir.display(), "failed to store photo");
                None
            }
        }
    }

    #[instrument(name = "birthday_sync.photos.trim", skip_all, fields(live = live_keys.len()))]
    async fn trim(&self, live_keys: &HashSet<String>) -> Result<(), PhotoCacheError> {
        let removed = self
            .remove_where(|path| key_of(path).map_or(true, |k| !live_keys.contains(k)))
            .await?;
        debug!(removed, "photo cache trimmed");
        Ok(())
    }

    #[instrument(name = "birthday_sync.photos.clear", skip_all)]
    async fn clear(&self) -> Result<(), PhotoCacheError> {
        let removed = self.remove_where(|_| true).await?;
        debug!(removed, "photo cache cleared");
        Ok(())
    }
}
