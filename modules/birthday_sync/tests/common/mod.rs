//! Shared fakes for the birthday_sync integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use parking_lot::Mutex;

use birthday_sync::domain::contact::{BirthdayParts, Candidate, ContactRecord};
use birthday_sync::domain::error::{DirectoryError, PhotoCacheError, StoreError};
use birthday_sync::domain::ports::{
    Account, Clock, ConnectionsPage, CredentialProvider, DirectoryPort, KeyValueStore, PhotoCache,
};
use birthday_sync::domain::service::{EngineConfig, SyncEngine};
use birthday_sync::domain::snapshot_store::SnapshotStore;
use birthday_sync::infra::auth::StaticTokenProvider;
use birthday_sync::infra::photos::photo_key;
use birthday_sync::infra::storage::InMemoryKeyValueStore;

pub const STATE_KEY: &str = "birthday_state_json";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub struct FixedClock {
    pub today: NaiveDate,
    pub now: DateTime<Utc>,
}

impl FixedClock {
    pub fn on(today: NaiveDate) -> Self {
        let now = Utc
            .from_utc_datetime(&today.and_hms_opt(9, 30, 0).unwrap());
        Self { today, now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn today(&self) -> NaiveDate {
        self.today
    }
}

/// Serves scripted pages in order and records the cursor of every call.
pub struct ScriptedDirectory {
    pages: Mutex<Vec<Result<ConnectionsPage, DirectoryError>>>,
    pub requested: Mutex<Vec<Option<String>>>,
    pub tokens: Mutex<Vec<String>>,
}

impl ScriptedDirectory {
    pub fn new(mut pages: Vec<Result<ConnectionsPage, DirectoryError>>) -> Self {
        pages.reverse();
        Self {
            pages: Mutex::new(pages),
            requested: Mutex::new(Vec::new()),
            tokens: Mutex::new(Vec::new()),
        }
    }

    pub fn single(contacts: Vec<ContactRecord>) -> Self {
        Self::new(vec![page(contacts, None)])
    }

    pub fn calls(&self) -> usize {
        self.requested.lock().len()
    }
}

#[async_trait]
impl DirectoryPort for ScriptedDirectory {
    async fn list_connections(
        &self,
        access_token: &str,
        page_token: Option<&str>,
    ) -> Result<ConnectionsPage, DirectoryError> {
        self.requested.lock().push(page_token.map(str::to_string));
        self.tokens.lock().push(access_token.to_string());
        self.pages
            .lock()
            .pop()
            .unwrap_or_else(|| Err(DirectoryError::unknown("unexpected page request")))
    }
}

pub fn page(
    contacts: Vec<ContactRecord>,
    next: Option<&str>,
) -> Result<ConnectionsPage, DirectoryError> {
    Ok(ConnectionsPage {
        contacts,
        next_page_token: next.map(str::to_string),
    })
}

pub fn contact(id: &str, name: Option<&str>, month: u32, day: u32) -> ContactRecord {
    ContactRecord {
        resource_name: id.to_string(),
        names: name
            .map(|n| vec![Candidate::new(n.to_string(), true)])
            .unwrap_or_default(),
        birthdays: vec![BirthdayParts {
            year: None,
            month: Some(month),
            day: Some(day),
        }],
        photos: vec![],
    }
}

pub fn with_photo(mut record: ContactRecord, url: &str) -> ContactRecord {
    record.photos.push(Candidate::new(url.to_string(), true));
    record
}

/// Photo cache fake: URLs containing `/hit/` resolve, everything else misses.
#[derive(Default)]
pub struct RecordingPhotos {
    pub fetched: Mutex<Vec<(String, Option<String>)>>,
    pub trims: Mutex<Vec<HashSet<String>>>,
    pub clears: AtomicUsize,
}

impl RecordingPhotos {
    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PhotoCache for RecordingPhotos {
    fn key_for(&self, identifier: &str) -> String {
        photo_key(identifier)
    }

    async fn fetch_or_populate(
        &self,
        identifier: &str,
        url: &str,
        token: Option<&str>,
    ) -> Option<PathBuf> {
        self.fetched
            .lock()
            .push((identifier.to_string(), token.map(str::to_string)));
        url.contains("/hit/")
            .then(|| PathBuf::from(format!("/cache/{}.jpg", photo_key(identifier))))
    }

    async fn trim(&self, live_keys: &HashSet<String>) -> Result<(), PhotoCacheError> {
        self.trims.lock().push(live_keys.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), PhotoCacheError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Key-value store whose writes always fail.
pub struct ReadOnlyStore;

#[async_trait]
impl KeyValueStore for ReadOnlyStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    async fn put(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only storage").into())
    }
}

/// Credential provider that always asks for re-consent.
pub struct ExpiredGrant;

#[async_trait]
impl CredentialProvider for ExpiredGrant {
    async fn access_token(&self) -> Result<String, DirectoryError> {
        Err(DirectoryError::auth_expired("consent revoked"))
    }
}

pub fn account(token: &str) -> Account {
    Account::new("me@example.com", Arc::new(StaticTokenProvider::new(token)))
}

pub struct Harness {
    pub engine: SyncEngine,
    pub store: Arc<SnapshotStore>,
    pub directory: Arc<ScriptedDirectory>,
    pub photos: Arc<RecordingPhotos>,
}

pub fn harness(directory: ScriptedDirectory, today: NaiveDate) -> Harness {
    harness_with_kv(directory, today, Arc::new(InMemoryKeyValueStore::new()))
}

pub fn harness_with_kv(
    directory: ScriptedDirectory,
    today: NaiveDate,
    kv: Arc<dyn KeyValueStore>,
) -> Harness {
    harness_with_config(directory, today, kv, EngineConfig::default())
}

pub fn harness_with_config(
    directory: ScriptedDirectory,
    today: NaiveDate,
    kv: Arc<dyn KeyValueStore>,
    config: EngineConfig,
) -> Harness {
    let directory = Arc::new(directory);
    let photos = Arc::new(RecordingPhotos::default());
    let store = Arc::new(SnapshotStore::new(kv, STATE_KEY));
    let engine = SyncEngine::new(
        directory.clone(),
        photos.clone(),
        store.clone(),
        Arc::new(FixedClock::on(today)),
        config,
    );
    Harness {
        engine,
        store,
        directory,
        photos,
    }
}
