use async_trait::async_trait;
use std::io;
use std::path::PathBuf;

use crate::domain::error::DirectoryError;
use crate::domain::ports::CredentialProvider;

/// Reads the bearer token the sign-in flow left on disk, once per call, so
/// a refreshed token is picked up by the next cycle.
pub struct FileTokenProvider {
    path: PathBuf,
}

impl FileTokenProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CredentialProvider for FileTokenProvider {
    async fn access_token(&self) -> Result<String, DirectoryError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => {
                let token = raw.trim();
                if token.is_empty() {
                    Err(DirectoryError::auth_expired("token file is empty"))
                } else {
                    Ok(token.to_string())
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(DirectoryError::auth_expired(
                format!("no token at {}", self.path.display()),
            )),
            Err(e) => Err(DirectoryError::unknown(format!(
                "cannot read token file {}: {e}",
                self.path.display()
            ))),
        }
    }
}

/// Fixed token, for hosts that manage refresh themselves and for tests.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String, DirectoryError> {
        if self.token.is_empty() {
            return Err(DirectoryError::auth_expired("empty token"));
        }
        Ok(self.token.clone())
    }
}
