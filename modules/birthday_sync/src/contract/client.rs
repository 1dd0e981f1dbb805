use async_trait::async_trait;

use crate::contract::{
    error::BirthdaySyncError,
    model::{Snapshot, SyncOutcome},
};

/// Public API of the birthday_sync module for hosts (CLI, schedulers, UIs).
#[async_trait]
pub trait BirthdaySyncApi: Send + Sync {
    /// Run one sync cycle for the current account ("run now").
    async fn sync_now(&self) -> SyncOutcome;

    /// Latest persisted snapshot; the default snapshot if none was saved yet.
    async fn snapshot(&self) -> Snapshot;

    /// Forget the account: drop cached photos and reset the snapshot.
    async fn sign_out(&self) -> Result<(), BirthdaySyncError>;
}
