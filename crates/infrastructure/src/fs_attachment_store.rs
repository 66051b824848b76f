use std::path::PathBuf;

use async_trait::async_trait;
use grievance_application::AttachmentStore;
use grievance_core::{AppError, AppResult};
use tracing::debug;
use url::Url;

/// Filesystem blob store writing attachment bytes under a root directory
/// and returning `file://` URLs.
#[derive(Debug, Clone)]
pub struct FsAttachmentStore {
    root: PathBuf,
}

impl FsAttachmentStore {
    /// Creates a store rooted at the given directory. The root must be an
    /// absolute path so stored blobs get resolvable URLs.
    pub fn new(root: impl Into<PathBuf>) -> AppResult<Self> {
        let root = root.into();
        if !root.is_absolute() {
            return Err(AppError::Validation(format!(
                "attachment root '{}' must be an absolute path",
                root.display()
            )));
        }

        Ok(Self { root })
    }
}

#[async_trait]
impl AttachmentStore for FsAttachmentStore {
    async fn upload(&self, path: &str, content_type: &str, bytes: &[u8]) -> AppResult<String> {
        let target = self.root.join(path);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|error| {
                AppError::Store(format!(
                    "failed to create attachment directory '{}': {error}",
                    parent.display()
                ))
            })?;
        }

        tokio::fs::write(&target, bytes).await.map_err(|error| {
            AppError::Store(format!(
                "failed to write attachment '{}': {error}",
                target.display()
            ))
        })?;

        debug!(path, content_type, size = bytes.len(), "attachment stored");

        let url = Url::from_file_path(&target).map_err(|()| {
            AppError::Internal(format!(
                "attachment path '{}' is not representable as a URL",
                target.display()
            ))
        })?;

        Ok(url.to_string())
    }
}
