use async_trait::async_trait;

use crate::domain::contact::ContactRecord;
use crate::domain::error::DirectoryError;

/// One page of the "list connections" call.
#[derive(Debug, Clone, Default)]
pub struct ConnectionsPage {
    pub contacts: Vec<ContactRecord>,
    /// Continuation cursor; `None` or empty ends pagination.
    pub next_page_token: Option<String>,
}

/// Transport-agnostic access to the remote contact directory.
#[async_trait]
pub trait DirectoryPort: Send + Sync {
    async fn list_connections(
        &self,
        access_token: &str,
        page_token: Option<&str>,
    ) -> Result<ConnectionsPage, DirectoryError>;
}
