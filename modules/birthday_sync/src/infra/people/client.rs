use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, instrument};

use crate::domain::error::DirectoryError;
use crate::domain::ports::{ConnectionsPage, DirectoryPort};
use crate::infra::http::TracedClient;
use crate::infra::people::dto::ConnectionsResponse;
use crate::infra::people::mapper::to_record;

const PERSON_FIELDS: &str = "names,birthdays,photos";

/// People API implementation of [`DirectoryPort`].
pub struct PeopleDirectoryClient {
    http: TracedClient,
    base_url: String,
    page_size: u32,
}

impl PeopleDirectoryClient {
    pub fn new(http: TracedClient, base_url: impl Into<String>, page_size: u32) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            page_size: page_size.max(1),
        }
    }

    fn connections_url(&self) -> String {
        format!("{}/v1/people/me/connections", self.base_url)
    }
}

#[async_trait]
impl DirectoryPort for PeopleDirectoryClient {
    #[instrument(
        name = "birthday_sync.people.list_connections",
        skip_all,
        fields(first_page = page_token.is_none())
    )]
    async fn list_connections(
        &self,
        access_token: &str,
        page_token: Option<&str>,
    ) -> Result<ConnectionsPage, DirectoryError> {
        let page_size = self.page_size.to_string();
        let mut query = vec![
            ("pageSize", page_size.as_str()),
            ("personFields", PERSON_FIELDS),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let response = self
            .http
            .get_bearer(&self.connections_url(), access_token, &query)
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_status(status));
        }

        let body: ConnectionsResponse = response.json().await.map_err(|e| {
            if e.is_decode() {
                DirectoryError::unknown(format!("malformed connections response: {e}"))
            } else {
                map_transport_error(e)
            }
        })?;
        debug!(
            received = body.connections.len(),
            total = body.total_people,
            "connections page decoded"
        );

        Ok(ConnectionsPage {
            contacts: body.connections.into_iter().filter_map(to_record).collect(),
            next_page_token: body.next_page_token,
        })
    }
}

/// 401/403 need the user; every other non-2xx is worth another try.
pub(crate) fn map_status(status: StatusCode) -> DirectoryError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            DirectoryError::auth_expired(format!("People API returned {status}"))
        }
        _ => DirectoryError::transient(format!("People API returned {status}")),
    }
}

pub(crate) fn map_transport_error(e: reqwest::Error) -> DirectoryError {
    if e.is_builder() {
        DirectoryError::unknown(format!("invalid request: {e}"))
    } else if e.is_timeout() {
        DirectoryError::transient("request timed out")
    } else if e.is_connect() {
        DirectoryError::transient(format!("connection failed: {e}"))
    } else {
        DirectoryError::transient(e.to_string())
    }
}
