use std::collections::HashMap;

use async_trait::async_trait;
use eventdesk_application::{ImageStore, ImageUpload};
use eventdesk_core::AppResult;
use tokio::sync::Mutex;

/// In-memory object store for tests and local development.
///
/// Issued URLs use a `memory://` scheme so they are recognizably
/// non-routable outside tests.
#[derive(Default)]
pub struct InMemoryImageStore {
    objects: Mutex<HashMap<String, ImageUpload>>,
}

impl InMemoryImageStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored objects.
    pub async fn object_count(&self) -> usize {
        self.objects.lock().await.len()
    }
}

fn object_path(name: &str, directory: &str) -> String {
    let directory = directory.trim_matches('/');
    format!("{directory}/{name}")
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn store_image(
        &self,
        name: &str,
        directory: &str,
        image: &ImageUpload,
    ) -> AppResult<String> {
        let path = object_path(name, directory);
        self.objects.lock().await.insert(path.clone(), image.clone());
        Ok(format!("memory://{path}"))
    }

    async fn delete_image(&self, name: &str, directory: &str) -> AppResult<()> {
        self.objects.lock().await.remove(&object_path(name, directory));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use eventdesk_application::{ImageStore, ImageUpload};

    use super::InMemoryImageStore;

    fn png_upload() -> ImageUpload {
        ImageUpload {
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
            content_type: "image/png".to_owned(),
        }
    }

    #[tokio::test]
    async fn store_issues_stable_urls_and_delete_is_idempotent() {
        let store = InMemoryImageStore::new();

        let url = store
            .store_image("thumbnail-abc", "user-details/events", &png_upload())
            .await;
        assert_eq!(
            url.ok().as_deref(),
            Some("memory://user-details/events/thumbnail-abc")
        );
        assert_eq!(store.object_count().await, 1);

        assert!(store
            .delete_image("thumbnail-abc", "user-details/events")
            .await
            .is_ok());
        assert!(store
            .delete_image("thumbnail-abc", "user-details/events")
            .await
            .is_ok());
        assert_eq!(store.object_count().await, 0);
    }
}
