use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::domain::ports::RenderSurface;

/// Render surface that mirrors every saved snapshot into a JSON file, for
/// widgets or status bars that poll a path instead of subscribing.
pub struct FileMirrorSurface {
    path: PathBuf,
}

impl FileMirrorSurface {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write(&self, serialized: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, serialized).await?;
        tokio::fs::rename(&tmp, &self.path).await
    }
}

#[async_trait]
impl RenderSurface for FileMirrorSurface {
    async fn render(&self, key: &str, serialized: &str) {
        // Failures are logged, never propagated.
        match self.write(serialized).await {
            Ok(()) => debug!(key, path = %self.path.display(), "snapshot mirrored"),
            Err(e) => warn!(key, path = %self.path.display(), error = %e, "snapshot mirror failed"),
        }
    }
}
