use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A birthday inside the lookahead window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingBirthday {
    /// Remote resource name of the contact.
    pub id: String,
    pub name: String,
    /// Next occurrence, serialized as `YYYY-MM-DD`.
    pub iso_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_path: Option<PathBuf>,
}

/// The single durable result of the latest sync attempt.
///
/// Replaced wholesale on every cycle and on sign-out; never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub has_account: bool,
    pub entries: Vec<UpcomingBirthday>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_synced_epoch_millis: Option<i64>,
}

impl Snapshot {
    /// Signed-out state: no entries, no error, never synced.
    pub fn no_account() -> Self {
        Self::default()
    }

    pub fn synced(entries: Vec<UpcomingBirthday>, at: DateTime<Utc>) -> Self {
        Self {
            has_account: true,
            entries,
            error_message: None,
            last_synced_epoch_millis: Some(at.timestamp_millis()),
        }
    }

    pub fn failed(message: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            has_account: true,
            entries: Vec::new(),
            error_message: Some(message.into()),
            last_synced_epoch_millis: Some(at.timestamp_millis()),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Missing or blank input yields the default snapshot.
    pub fn from_json(raw: Option<&str>) -> Result<Self, serde_json::Error> {
        match raw {
            Some(s) if !s.trim().is_empty() => serde_json::from_str(s),
            _ => Ok(Self::default()),
        }
    }
}

/// Result of one sync cycle as seen by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Done; includes cycles that stored an authorization message.
    Success,
    /// Transient failure; the scheduler should try again later.
    Retry { message: String },
    /// Permanent failure; retrying would not help.
    Failure { message: String },
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SyncOutcome::Success)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            SyncOutcome::Success => None,
            SyncOutcome::Retry { message } | SyncOutcome::Failure { message } => Some(message),
        }
    }
}
