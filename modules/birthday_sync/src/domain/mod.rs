pub mod contact;
pub mod directory;
pub mod error;
pub mod occurrence;
pub mod ports;
pub mod service;
pub mod snapshot_store;

pub use service::{EngineConfig, SyncEngine, SyncState};
pub use snapshot_store::SnapshotStore;
