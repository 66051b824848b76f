use std::collections::HashMap;

use async_trait::async_trait;
use grievance_application::AttachmentStore;
use grievance_core::AppResult;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredBlob {
    content_type: String,
    bytes: Vec<u8>,
}

/// In-memory blob store returning `memory://` URLs.
#[derive(Debug, Default)]
pub struct InMemoryAttachmentStore {
    blobs: RwLock<HashMap<String, StoredBlob>>,
}

impl InMemoryAttachmentStore {
    /// Creates an empty in-memory blob store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Returns how many blobs have been stored.
    pub async fn blob_count(&self) -> usize {
        self.blobs.read().await.len()
    }

    /// Returns the stored bytes for a path, if present.
    pub async fn bytes_at(&self, path: &str) -> Option<Vec<u8>> {
        self.blobs
            .read()
            .await
            .get(path)
            .map(|blob| blob.bytes.clone())
    }

    /// Returns the stored content type for a path, if present.
    pub async fn content_type_at(&self, path: &str) -> Option<String> {
        self.blobs
            .read()
            .await
            .get(path)
            .map(|blob| blob.content_type.clone())
    }
}

#[async_trait]
impl AttachmentStore for InMemoryAttachmentStore {
    async fn upload(&self, path: &str, content_type: &str, bytes: &[u8]) -> AppResult<String> {
        self.blobs.write().await.insert(
            path.to_owned(),
            StoredBlob {
                content_type: content_type.to_owned(),
                bytes: bytes.to_vec(),
            },
        );

        Ok(format!("memory://{path}"))
    }
}

#[cfg(test)]
mod tests {
    use grievance_application::AttachmentStore;

    use super::InMemoryAttachmentStore;

    #[tokio::test]
    async fn upload_returns_a_memory_url_and_keeps_bytes() {
        let store = InMemoryAttachmentStore::new();

        let url = store
            .upload("grievances/uid/1_photo.png", "image/png", &[1, 2, 3])
            .await;
        assert!(url.is_ok());
        assert_eq!(
            url.unwrap_or_default(),
            "memory://grievances/uid/1_photo.png"
        );

        assert_eq!(store.blob_count().await, 1);
        assert_eq!(
            store.bytes_at("grievances/uid/1_photo.png").await,
            Some(vec![1, 2, 3])
        );
        assert_eq!(
            store.content_type_at("grievances/uid/1_photo.png").await,
            Some("image/png".to_owned())
        );
    }

    #[tokio::test]
    async fn later_upload_to_the_same_path_overwrites() {
        let store = InMemoryAttachmentStore::new();

        let first = store.upload("p", "image/png", &[1]).await;
        assert!(first.is_ok());
        let second = store.upload("p", "image/png", &[2]).await;
        assert!(second.is_ok());

        assert_eq!(store.bytes_at("p").await, Some(vec![2]));
    }
}
