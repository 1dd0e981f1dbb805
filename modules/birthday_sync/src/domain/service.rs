use std::collections::HashSet;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use futures::{StreamExt, TryStreamExt};
use tracing::{debug, error, info, instrument, warn};

use crate::contract::model::{Snapshot, SyncOutcome, UpcomingBirthday};
use crate::domain::contact::ContactRecord;
use crate::domain::directory::fetch_all;
use crate::domain::error::{FailureKind, ResetError, SyncError};
use crate::domain::occurrence::within_window;
use crate::domain::ports::{Account, Clock, DirectoryPort, PhotoCache};
use crate::domain::snapshot_store::SnapshotStore;

pub const AUTHORIZATION_NEEDED: &str =
    "Authorization needed. Sign in again to allow access to your contacts.";
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Where the engine is within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SyncState {
    Idle,
    Fetching,
    Filtering,
    Caching,
    Persisting,
    Success,
    Retryable,
    Failed,
}

impl SyncState {
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn from_u8(x: u8) -> Self {
        match x {
            1 => SyncState::Fetching,
            2 => SyncState::Filtering,
            3 => SyncState::Caching,
            4 => SyncState::Persisting,
            5 => SyncState::Success,
            6 => SyncState::Retryable,
            7 => SyncState::Failed,
            _ => SyncState::Idle,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub window_days: u32,
    pub photo_concurrency: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_days: 14,
            photo_concurrency: 4,
        }
    }
}

/// A contact that passed the name and window filters.
struct Selected {
    id: String,
    name: String,
    date: NaiveDate,
    photo_url: Option<String>,
}

/// Runs fetch → filter → cache → persist cycles.
///
/// Assumes one cycle at a time; the scheduler coalesces triggers. The only
/// writes are the photo files and the snapshot. Every snapshot write happens
/// in [`SyncState::Persisting`]; a caller may drop `run` before that state,
/// never during it.
pub struct SyncEngine {
    directory: Arc<dyn DirectoryPort>,
    photos: Arc<dyn PhotoCache>,
    store: Arc<SnapshotStore>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    state: AtomicU8,
}

impl SyncEngine {
    pub fn new(
        directory: Arc<dyn DirectoryPort>,
        photos: Arc<dyn PhotoCache>,
        store: Arc<SnapshotStore>,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        Self {
            directory,
            photos,
            store,
            clock,
            config,
            state: AtomicU8::new(SyncState::Idle.as_u8()),
        }
    }

    pub fn state(&self) -> SyncState {
        SyncState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Marks a cycle whose future was dropped before persisting.
    pub fn abandon(&self) {
        self.transition(SyncState::Idle);
        info!("sync cycle abandoned");
    }

    fn transition(&self, next: SyncState) {
        self.state.store(next.as_u8(), Ordering::Release);
        debug!(state = ?next, "sync state changed");
    }

    /// One full cycle. `None` means nobody is signed in, which is a normal
    /// outcome: the cache is emptied and a signed-out snapshot stored.
    #[instrument(
        name = "birthday_sync.engine.run",
        skip_all,
        fields(has_account = account.is_some())
    )]
    pub async fn run(&self, account: Option<&Account>) -> SyncOutcome {
        let Some(account) = account else {
            return self.reset_without_account().await;
        };

        match self.cycle(account).await {
            Ok(entries) => {
                self.transition(SyncState::Success);
                info!(entries, "sync cycle completed");
                SyncOutcome::Success
            }
            Err(err) => self.fail(err).await,
        }
    }

    /// Sign-out: wipe cached photos, then store the signed-out snapshot.
    /// The snapshot is reset even when the photo wipe fails.
    #[instrument(name = "birthday_sync.engine.reset", skip_all)]
    pub async fn reset(&self) -> Result<(), ResetError> {
        let photos = self.photos.clear().await;
        self.store.clear().await?;
        self.transition(SyncState::Idle);
        photos?;
        info!("account data reset");
        Ok(())
    }

    async fn reset_without_account(&self) -> SyncOutcome {
        info!("no account signed in; resetting snapshot");
        if let Err(e) = self.photos.clear().await {
            warn!(error = %e, "failed to clear photo cache");
        }

        self.transition(SyncState::Persisting);
        match self.store.save(&Snapshot::no_account()).await {
            Ok(()) => {
                self.transition(SyncState::Success);
                SyncOutcome::Success
            }
            Err(e) => {
                // No error snapshot here: a signed-out snapshot carries no message.
                let (kind, message) = classify(&SyncError::from(e));
                self.finish(kind, message)
            }
        }
    }

    async fn cycle(&self, account: &Account) -> Result<usize, SyncError> {
        let today = self.clock.today();

        self.transition(SyncState::Fetching);
        let token = account.credential.access_token().await?;
        let contacts: Vec<ContactRecord> = fetch_all(self.directory.as_ref(), &token)
            .try_collect()
            .await?;
        info!(contacts = contacts.len(), "directory fetched");

        self.transition(SyncState::Filtering);
        let selected = self.select_upcoming(contacts, today);

        self.transition(SyncState::Caching);
        let (mut entries, live_keys) = self.cache_photos(selected, &token).await;
        self.evict_stale(&live_keys).await;

        self.transition(SyncState::Persisting);
        entries.sort_by_key(|e| e.iso_date);
        let snapshot = Snapshot::synced(entries, self.clock.now());
        self.store.save(&snapshot).await?;
        Ok(snapshot.entries.len())
    }

    fn select_upcoming(&self, contacts: Vec<ContactRecord>, today: NaiveDate) -> Vec<Selected> {
        contacts
            .into_iter()
            .filter_map(|record| {
                let date = record.next_birthday(today)?;
                if !within_window(date, today, self.config.window_days) {
                    return None;
                }
                let Some(name) = record.display_name() else {
                    debug!(id = %record.resource_name, "dropping contact without a display name");
                    return None;
                };
                Some(Selected {
                    name: name.to_string(),
                    photo_url: record.photo_url().map(str::to_string),
                    id: record.resource_name,
                    date,
                })
            })
            .collect()
    }

    /// Photo downloads run concurrently; the live-key set is only returned
    /// once every download of the cycle has finished.
    async fn cache_photos(
        &self,
        selected: Vec<Selected>,
        token: &str,
    ) -> (Vec<UpcomingBirthday>, HashSet<String>) {
        let photos = self.photos.as_ref();
        let results: Vec<(UpcomingBirthday, Option<String>)> = futures::stream::iter(selected)
            .map(|s| async move {
                let photo_path = match s.photo_url.as_deref() {
                    Some(url) => photos.fetch_or_populate(&s.id, url, Some(token)).await,
                    None => None,
                };
                let live_key = photo_path.as_ref().map(|_| photos.key_for(&s.id));
                let entry = UpcomingBirthday {
                    id: s.id,
                    name: s.name,
                    iso_date: s.date,
                    photo_path,
                };
                (entry, live_key)
            })
            .buffered(self.config.photo_concurrency.max(1))
            .collect()
            .await;

        let mut live_keys = HashSet::new();
        let entries = results
            .into_iter()
            .map(|(entry, key)| {
                live_keys.extend(key);
                entry
            })
            .collect();
        (entries, live_keys)
    }

    /// A cycle without any live photo empties the whole cache.
    async fn evict_stale(&self, live_keys: &HashSet<String>) {
        let result = if live_keys.is_empty() {
            self.photos.clear().await
        } else {
            self.photos.trim(live_keys).await
        };
        if let Err(e) = result {
            warn!(error = %e, live = live_keys.len(), "photo cache eviction failed");
        }
    }

    async fn fail(&self, err: SyncError) -> SyncOutcome {
        let (kind, message) = classify(&err);
        match kind {
            FailureKind::AuthExpired => warn!(error = %err, "sync needs re-authorization"),
            FailureKind::TransientNetwork => warn!(error = %err, "sync failed; will retry"),
            FailureKind::PermanentFailure => error!(error = %err, "sync failed permanently"),
        }

        self.transition(SyncState::Persisting);
        let snapshot = Snapshot::failed(message.clone(), self.clock.now());
        if let Err(e) = self.store.save(&snapshot).await {
            error!(error = %e, "failed to persist error snapshot");
        }
        self.finish(kind, message)
    }

    fn finish(&self, kind: FailureKind, message: String) -> SyncOutcome {
        match kind {
            FailureKind::AuthExpired => {
                self.transition(SyncState::Success);
                SyncOutcome::Success
            }
            FailureKind::TransientNetwork => {
                self.transition(SyncState::Retryable);
                SyncOutcome::Retry { message }
            }
            FailureKind::PermanentFailure => {
                self.transition(SyncState::Failed);
                SyncOutcome::Failure { message }
            }
        }
    }
}

/// The single mapping from a failed cycle to retry policy and user-facing text.
fn classify(err: &SyncError) -> (FailureKind, String) {
    let kind = err.kind();
    let message = match kind {
        FailureKind::AuthExpired => AUTHORIZATION_NEEDED.to_string(),
        FailureKind::TransientNetwork => format!("Sync failed: {}", detail(err)),
        FailureKind::PermanentFailure => detail(err),
    };
    (kind, message)
}

fn detail(err: &SyncError) -> String {
    let text = err.to_string();
    if text.trim().is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        text
    }
}
