use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::contract::model::Snapshot;
use crate::domain::error::StoreError;
use crate::domain::ports::{KeyValueStore, RenderSurface};

/// Durable home of the single current [`Snapshot`].
///
/// Built once at process start and shared by the engine and the hosts.
/// Every `save` hands the serialized value to all subscribed render surfaces
/// before returning.
pub struct SnapshotStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
    surfaces: RwLock<Vec<Arc<dyn RenderSurface>>>,
}

impl SnapshotStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
            surfaces: RwLock::new(Vec::new()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn subscribe(&self, surface: Arc<dyn RenderSurface>) {
        self.surfaces.write().push(surface);
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.read().len()
    }

    #[instrument(
        name = "birthday_sync.snapshot_store.save",
        skip_all,
        fields(has_account = snapshot.has_account, entries = snapshot.entries.len())
    )]
    pub async fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let json = snapshot.to_json()?;
        self.kv.put(&self.key, &json).await?;

        // Snapshot the list so no lock is held across awaits.
        let surfaces: Vec<_> = self.surfaces.read().clone();
        for surface in &surfaces {
            surface.render(&self.key, &json).await;
        }
        debug!(surfaces = surfaces.len(), "snapshot saved");
        Ok(())
    }

    /// Never fails: missing, blank or unreadable state is the default snapshot.
    #[instrument(name = "birthday_sync.snapshot_store.load", skip_all)]
    pub async fn load(&self) -> Snapshot {
        let raw = match self.kv.get(&self.key).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "snapshot storage unreadable; using default");
                return Snapshot::default();
            }
        };
        Snapshot::from_json(raw.as_deref()).unwrap_or_else(|e| {
            warn!(error = %e, "stored snapshot is malformed; using default");
            Snapshot::default()
        })
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        self.save(&Snapshot::no_account()).await
    }
}
