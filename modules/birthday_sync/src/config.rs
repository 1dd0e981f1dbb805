use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the birthday_sync module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BirthdaySyncConfig {
    /// Days after "today" within which a birthday is reported.
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    /// Connections requested per directory page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_people_base_url")]
    pub people_base_url: String,
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Photo downloads in flight at once.
    #[serde(default = "default_photo_concurrency")]
    pub photo_concurrency: usize,
    /// Photo cache directory, relative to the home dir unless absolute.
    #[serde(default = "default_photo_dir")]
    pub photo_dir: String,
    /// Key-value state file, relative to the home dir unless absolute.
    #[serde(default = "default_state_file")]
    pub state_file: String,
    /// Key under which the serialized snapshot is stored.
    #[serde(default = "default_state_key")]
    pub state_key: String,
    /// Signed-in account; absent means "no account".
    #[serde(default)]
    pub account: Option<AccountConfig>,
    /// Files that receive every saved snapshot (render surfaces).
    #[serde(default)]
    pub render_mirrors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountConfig {
    pub email: String,
    /// File holding the bearer token written by the sign-in flow.
    pub token_file: String,
}

impl Default for BirthdaySyncConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            page_size: default_page_size(),
            people_base_url: default_people_base_url(),
            request_timeout: default_request_timeout(),
            photo_concurrency: default_photo_concurrency(),
            photo_dir: default_photo_dir(),
            state_file: default_state_file(),
            state_key: default_state_key(),
            account: None,
            render_mirrors: Vec::new(),
        }
    }
}

fn default_window_days() -> u32 {
    14
}

fn default_page_size() -> u32 {
    400
}

fn default_people_base_url() -> String {
    "https://people.googleapis.com".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_photo_concurrency() -> usize {
    4
}

fn default_photo_dir() -> String {
    "widget_photos".to_string()
}

fn default_state_file() -> String {
    "birthday_widget.json".to_string()
}

fn default_state_key() -> String {
    "birthday_state_json".to_string()
}
