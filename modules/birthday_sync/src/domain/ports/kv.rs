use async_trait::async_trait;

use crate::domain::error::StoreError;

/// Preference-style string store holding the serialized snapshot.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    /// Replace the value under `key` as a whole.
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
