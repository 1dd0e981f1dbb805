//! Public contract: error mapping and the in-process client.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use birthday_sync::contract::error::BirthdaySyncError;
use birthday_sync::contract::model::{Snapshot, SyncOutcome};
use birthday_sync::domain::error::{DirectoryError, PhotoCacheError, ResetError, StoreError};
use birthday_sync::domain::ports::{ConnectionsPage, DirectoryPort, RenderSurface};
use birthday_sync::domain::service::{EngineConfig, SyncEngine, SyncState};
use birthday_sync::domain::snapshot_store::SnapshotStore;
use birthday_sync::infra::storage::InMemoryKeyValueStore;
use birthday_sync::BirthdaySync;

use common::*;

#[test]
fn reset_errors_map_to_contract_variants() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: BirthdaySyncError = ResetError::from(PhotoCacheError::io("/cache", io)).into();
    assert!(matches!(err, BirthdaySyncError::Cache { .. }));
    assert!(err.to_string().contains("denied"));

    let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
    let err: BirthdaySyncError = ResetError::from(StoreError::from(io)).into();
    assert!(matches!(err, BirthdaySyncError::Storage { .. }));
    assert!(err.to_string().contains("disk full"));
}

#[test]
fn error_display() {
    assert_eq!(
        BirthdaySyncError::storage("x").to_string(),
        "Snapshot storage failed: x"
    );
    assert_eq!(
        BirthdaySyncError::cancelled().to_string(),
        "Sync cancelled before completion"
    );
}

fn module_with(directory: ScriptedDirectory) -> Arc<BirthdaySync> {
    let h = harness(directory, date(2024, 6, 1));
    Arc::new(BirthdaySync::from_parts(
        Arc::new(h.engine),
        h.store,
        Some(account("tok")),
    ))
}

#[tokio::test]
async fn local_client_runs_and_signs_out() {
    let module = module_with(ScriptedDirectory::single(vec![contact(
        "people/a",
        Some("Alice"),
        6,
        3,
    )]));
    let client = module.client();

    assert_eq!(client.sync_now().await, SyncOutcome::Success);
    let snapshot = client.snapshot().await;
    assert!(snapshot.has_account);
    assert_eq!(snapshot.entries[0].name, "Alice");

    client.sign_out().await.unwrap();
    assert!(module.account().is_none());
    assert_eq!(client.snapshot().await, Snapshot::no_account());

    // Without an account the next cycle stays signed out.
    assert_eq!(client.sync_now().await, SyncOutcome::Success);
    assert_eq!(client.snapshot().await, Snapshot::no_account());
}

#[tokio::test]
async fn sign_out_surfaces_storage_failure() {
    let h = harness_with_kv(
        ScriptedDirectory::new(vec![]),
        date(2024, 6, 1),
        Arc::new(ReadOnlyStore),
    );
    let module = Arc::new(BirthdaySync::from_parts(
        Arc::new(h.engine),
        h.store,
        Some(account("tok")),
    ));

    let err = module.client().sign_out().await.unwrap_err();
    assert!(matches!(err, BirthdaySyncError::Storage { .. }));
}

#[tokio::test]
async fn overlapping_triggers_run_one_after_another() {
    let module = module_with(ScriptedDirectory::new(vec![
        page(vec![contact("people/a", Some("A"), 6, 2)], None),
        page(vec![contact("people/b", Some("B"), 6, 3)], None),
    ]));

    let (first, second) = tokio::join!(module.sync_now(), module.sync_now());

    assert_eq!(first, SyncOutcome::Success);
    assert_eq!(second, SyncOutcome::Success);
    let entries = module.snapshot().await.entries;
    assert_eq!(entries.len(), 1);
}

/// Render surface that takes a while to draw.
#[derive(Default)]
struct SlowSurface {
    renders: AtomicUsize,
}

#[async_trait]
impl RenderSurface for SlowSurface {
    async fn render(&self, _key: &str, _serialized: &str) {
        tokio::time::sleep(Duration::from_millis(200)).await;
        self.renders.fetch_add(1, Ordering::SeqCst);
    }
}

/// Directory whose first page never arrives in time.
struct StalledDirectory;

#[async_trait]
impl DirectoryPort for StalledDirectory {
    async fn list_connections(
        &self,
        _access_token: &str,
        _page_token: Option<&str>,
    ) -> Result<ConnectionsPage, DirectoryError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Err(DirectoryError::transient("too slow"))
    }
}

fn cancel_after(delay: Duration) -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        trigger.cancel();
    });
    cancel
}

#[tokio::test]
async fn cancel_during_render_fan_out_finishes_the_write() {
    let h = harness(
        ScriptedDirectory::single(vec![contact("people/a", Some("Alice"), 6, 3)]),
        date(2024, 6, 1),
    );
    let surface = Arc::new(SlowSurface::default());
    h.store.subscribe(surface.clone());
    let module = BirthdaySync::from_parts(Arc::new(h.engine), h.store, Some(account("tok")));

    let cancel = cancel_after(Duration::from_millis(50));
    let result = module.sync_until_cancelled(&cancel).await;

    assert_eq!(result, Ok(SyncOutcome::Success));
    assert_eq!(surface.renders.load(Ordering::SeqCst), 1);
    assert_eq!(module.state(), SyncState::Success);
    assert_eq!(module.snapshot().await.entries.len(), 1);
}

#[tokio::test]
async fn cancel_during_fetch_writes_nothing_and_goes_idle() {
    let directory = Arc::new(StalledDirectory);
    let photos = Arc::new(RecordingPhotos::default());
    let store = Arc::new(SnapshotStore::new(
        Arc::new(InMemoryKeyValueStore::new()),
        STATE_KEY,
    ));
    let surface = Arc::new(SlowSurface::default());
    store.subscribe(surface.clone());
    let engine = SyncEngine::new(
        directory,
        photos,
        store.clone(),
        Arc::new(FixedClock::on(date(2024, 6, 1))),
        EngineConfig::default(),
    );
    let module = BirthdaySync::from_parts(Arc::new(engine), store, Some(account("tok")));

    let cancel = cancel_after(Duration::from_millis(50));
    let result = module.sync_until_cancelled(&cancel).await;

    assert_eq!(result, Err(BirthdaySyncError::Cancelled));
    assert_eq!(module.state(), SyncState::Idle);
    assert_eq!(surface.renders.load(Ordering::SeqCst), 0);
    assert_eq!(module.snapshot().await, Snapshot::default());
}
