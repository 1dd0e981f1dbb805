use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{
    client::BirthdaySyncApi,
    error::BirthdaySyncError,
    model::{Snapshot, SyncOutcome},
};
use crate::domain::error::ResetError;
use crate::module::BirthdaySync;

/// Local implementation of the BirthdaySyncApi trait that delegates to the module
pub struct BirthdaySyncLocalClient {
    module: Arc<BirthdaySync>,
}

impl BirthdaySyncLocalClient {
    pub fn new(module: Arc<BirthdaySync>) -> Self {
        Self { module }
    }
}

#[async_trait]
impl BirthdaySyncApi for BirthdaySyncLocalClient {
    async fn sync_now(&self) -> SyncOutcome {
        self.module.sync_now().await
    }

    async fn snapshot(&self) -> Snapshot {
        self.module.snapshot().await
    }

    async fn sign_out(&self) -> Result<(), BirthdaySyncError> {
        self.module.sign_out().await.map_err(Into::into)
    }
}

impl From<ResetError> for BirthdaySyncError {
    fn from(e: ResetError) -> Self {
        match e {
            ResetError::Photos(e) => BirthdaySyncError::cache(e.to_string()),
            ResetError::Store(e) => BirthdaySyncError::storage(e.to_string()),
        }
    }
}
