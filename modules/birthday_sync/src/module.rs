use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use arc_swap::ArcSwapOption;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::BirthdaySyncConfig;
use crate::contract::client::BirthdaySyncApi;
use crate::contract::error::BirthdaySyncError;
use crate::contract::model::{Snapshot, SyncOutcome};
use crate::domain::error::ResetError;
use crate::domain::ports::{Account, PhotoCache};
use crate::domain::service::{EngineConfig, SyncEngine, SyncState};
use crate::domain::snapshot_store::SnapshotStore;
use crate::gateways::local::BirthdaySyncLocalClient;
use crate::infra::auth::FileTokenProvider;
use crate::infra::clock::SystemClock;
use crate::infra::http::TracedClient;
use crate::infra::people::PeopleDirectoryClient;
use crate::infra::photos::FsPhotoCache;
use crate::infra::render::FileMirrorSurface;
use crate::infra::storage::FileKeyValueStore;

/// The birthday_sync module: one engine, one store, the current account.
///
/// Built once at process start. Cycles never overlap: a trigger that arrives
/// while a cycle runs waits for it to finish.
pub struct BirthdaySync {
    account: ArcSwapOption<Account>,
    engine: Arc<SyncEngine>,
    store: Arc<SnapshotStore>,
    run_lock: Mutex<()>,
}

impl BirthdaySync {
    /// Wire the production adapters from config. Relative paths resolve
    /// against `home_dir`.
    pub fn init(cfg: &BirthdaySyncConfig, home_dir: &Path) -> anyhow::Result<Self> {
        info!("Initializing birthday_sync module");
        debug!(
            window_days = cfg.window_days,
            page_size = cfg.page_size,
            base_url = %cfg.people_base_url,
            "Loaded birthday_sync config"
        );

        let base_url = url::Url::parse(&cfg.people_base_url)
            .with_context(|| format!("invalid people_base_url '{}'", cfg.people_base_url))?;
        let http = TracedClient::with_timeout(cfg.request_timeout)
            .context("failed to build HTTP client")?;
        let directory = PeopleDirectoryClient::new(http.clone(), base_url.as_str(), cfg.page_size);
        let photos: Arc<dyn PhotoCache> =
            Arc::new(FsPhotoCache::new(resolve(home_dir, &cfg.photo_dir), http));

        let kv = FileKeyValueStore::new(resolve(home_dir, &cfg.state_file));
        let store = Arc::new(SnapshotStore::new(Arc::new(kv), cfg.state_key.clone()));
        for mirror in &cfg.render_mirrors {
            store.subscribe(Arc::new(FileMirrorSurface::new(resolve(home_dir, mirror))));
        }

        let engine = SyncEngine::new(
            Arc::new(directory),
            photos,
            store.clone(),
            Arc::new(SystemClock),
            EngineConfig {
                window_days: cfg.window_days,
                photo_concurrency: cfg.photo_concurrency,
            },
        );

        let account = cfg.account.as_ref().map(|a| {
            let provider = FileTokenProvider::new(resolve(home_dir, &a.token_file));
            Account::new(a.email.clone(), Arc::new(provider))
        });
        info!(
            has_account = account.is_some(),
            render_mirrors = store.surface_count(),
            "birthday_sync module initialized"
        );

        Ok(Self::from_parts(Arc::new(engine), store, account))
    }

    /// Assemble from an already built engine; the engine must write through `store`.
    pub fn from_parts(
        engine: Arc<SyncEngine>,
        store: Arc<SnapshotStore>,
        account: Option<Account>,
    ) -> Self {
        Self {
            account: ArcSwapOption::new(account.map(Arc::new)),
            engine,
            store,
            run_lock: Mutex::new(()),
        }
    }

    pub fn account(&self) -> Option<Arc<Account>> {
        self.account.load_full()
    }

    /// Sign-in hook: later cycles run for `account`.
    pub fn set_account(&self, account: Option<Account>) {
        self.account.store(account.map(Arc::new));
    }

    pub fn state(&self) -> SyncState {
        self.engine.state()
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    /// "Run now" for the current account.
    pub async fn sync_now(&self) -> SyncOutcome {
        let _running = self.run_lock.lock().await;
        let account = self.account.load_full();
        self.engine.run(account.as_deref()).await
    }

    /// Like [`sync_now`](Self::sync_now), but gives up at the next await
    /// point once `cancel` fires. A cycle that already reached
    /// [`SyncState::Persisting`] is finished instead, so the stored snapshot
    /// and the render surfaces never disagree.
    pub async fn sync_until_cancelled(
        &self,
        cancel: &CancellationToken,
    ) -> Result<SyncOutcome, BirthdaySyncError> {
        let _running = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("sync cancelled before it started");
                return Err(BirthdaySyncError::cancelled());
            }
            guard = self.run_lock.lock() => guard,
        };

        let account = self.account.load_full();
        let run = self.engine.run(account.as_deref());
        tokio::pin!(run);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {}
            outcome = &mut run => return Ok(outcome),
        }

        if self.engine.state() == SyncState::Persisting {
            debug!("cancel arrived while persisting; finishing the write");
            return Ok(run.await);
        }
        self.engine.abandon();
        warn!("sync cancelled");
        Err(BirthdaySyncError::cancelled())
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.store.load().await
    }

    /// Forget the account, drop cached photos and reset the snapshot.
    pub async fn sign_out(&self) -> Result<(), ResetError> {
        self.account.store(None);
        let _running = self.run_lock.lock().await;
        self.engine.reset().await
    }

    /// In-process client for hosts that only see the contract.
    pub fn client(self: &Arc<Self>) -> Arc<dyn BirthdaySyncApi> {
        Arc::new(BirthdaySyncLocalClient::new(self.clone()))
    }
}

fn resolve(home_dir: &Path, configured: &str) -> PathBuf {
    let p = Path::new(configured);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        home_dir.join(p)
    }
}
