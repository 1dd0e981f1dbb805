use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::domain::error::DirectoryError;

/// Source of bearer tokens for the signed-in account.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// A fresh access token, or `AuthExpired` when the user must sign in again.
    async fn access_token(&self) -> Result<String, DirectoryError>;
}

/// The authenticated account a cycle runs for.
#[derive(Clone)]
pub struct Account {
    pub email: String,
    pub credential: Arc<dyn CredentialProvider>,
}

impl Account {
    pub fn new(email: impl Into<String>, credential: Arc<dyn CredentialProvider>) -> Self {
        Self {
            email: email.into(),
            credential,
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}
