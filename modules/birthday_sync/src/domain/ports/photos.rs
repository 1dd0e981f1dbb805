use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::domain::error::PhotoCacheError;

/// Local photo store keyed by a hash of the contact identifier.
#[async_trait]
pub trait PhotoCache: Send + Sync {
    /// Deterministic one-way key for `identifier`.
    fn key_for(&self, identifier: &str) -> String;

    /// Cached path if present; otherwise download with `token` and store.
    /// Any miss (no token, HTTP failure, I/O failure) is `None`, never an error.
    async fn fetch_or_populate(
        &self,
        identifier: &str,
        url: &str,
        token: Option<&str>,
    ) -> Option<PathBuf>;

    /// Delete every cached file whose key is not in `live_keys`.
    async fn trim(&self, live_keys: &HashSet<String>) -> Result<(), PhotoCacheError>;

    /// Delete every cached file.
    async fn clear(&self) -> Result<(), PhotoCacheError>;
}
