use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eventdesk_core::{AppResult, CallerIdentity, EventKey, NonEmptyString};
use eventdesk_domain::{AccessScope, EventRecord, FormField};

/// Raw image payload decoded at the API edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Decoded image bytes.
    pub bytes: Vec<u8>,
    /// MIME type declared by the upload (e.g. `image/png`).
    pub content_type: String,
}

/// Input for creating an event.
#[derive(Debug, Clone)]
pub struct NewEvent {
    /// Display name of the event.
    pub name: NonEmptyString,
    /// Long-form description.
    pub description: String,
    /// Start of the event window.
    pub starts_at: DateTime<Utc>,
    /// End of the event window.
    pub ends_at: DateTime<Utc>,
    /// Ordered default verification fields enabled for this event.
    pub fields: Vec<FormField>,
    /// Ordered custom verification fields.
    pub additional_fields: Vec<FormField>,
    /// Thumbnail image to store, if provided.
    pub thumbnail: Option<ImageUpload>,
    /// Banner image to store, if provided.
    pub banner: Option<ImageUpload>,
}

/// Partial update addressed by event key.
///
/// `None` fields keep their current value. The key and the owner never
/// change through an update.
#[derive(Debug, Clone, Default)]
pub struct EventUpdate {
    /// New display name, if changing.
    pub name: Option<NonEmptyString>,
    /// New description, if changing.
    pub description: Option<String>,
    /// New window start, if changing.
    pub starts_at: Option<DateTime<Utc>>,
    /// New window end, if changing.
    pub ends_at: Option<DateTime<Utc>>,
    /// Replacement default field list, if changing.
    pub fields: Option<Vec<FormField>>,
    /// Replacement custom field list, if changing.
    pub additional_fields: Option<Vec<FormField>>,
    /// Replacement thumbnail image, if changing.
    pub thumbnail: Option<ImageUpload>,
    /// Replacement banner image, if changing.
    pub banner: Option<ImageUpload>,
}

/// Filters applied when listing events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Case-insensitive free-text match over name, description, and key.
    pub search: Option<String>,
    /// Exact key match.
    pub key: Option<EventKey>,
    /// Case-insensitive name fragment.
    pub name_contains: Option<String>,
    /// Case-insensitive description fragment.
    pub description_contains: Option<String>,
    /// Lower bound on the event window start.
    pub starts_after: Option<DateTime<Utc>>,
    /// Upper bound on the event window end.
    pub ends_before: Option<DateTime<Utc>>,
    /// Lower bound on creation time.
    pub created_after: Option<DateTime<Utc>>,
    /// Lower bound on last update time.
    pub updated_after: Option<DateTime<Utc>>,
}

/// Pagination window for event listings.
#[derive(Debug, Clone, Copy)]
pub struct EventPage {
    /// One-based page number.
    pub page: usize,
    /// Page size.
    pub page_size: usize,
}

impl EventPage {
    /// Returns the number of records to skip.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

impl Default for EventPage {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
        }
    }
}

/// Repository port for persisted events.
///
/// Listings are ordered by creation time descending. Ownership narrowing
/// happens here: `find_owned_event` resolves by key AND owner so a
/// non-owner cannot distinguish someone else's event from a missing one.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Persists a new event.
    async fn insert_event(&self, event: EventRecord) -> AppResult<EventRecord>;

    /// Lists events visible under the given scope.
    async fn list_events(
        &self,
        scope: &AccessScope,
        filter: &EventFilter,
        page: EventPage,
    ) -> AppResult<Vec<EventRecord>>;

    /// Finds an event by key, restricted to the given owner.
    async fn find_owned_event(
        &self,
        key: &EventKey,
        owner: &CallerIdentity,
    ) -> AppResult<Option<EventRecord>>;

    /// Replaces a persisted event addressed by its key.
    async fn update_event(&self, event: EventRecord) -> AppResult<EventRecord>;

    /// Deletes an event by key.
    async fn delete_event(&self, key: &EventKey) -> AppResult<()>;

    /// Lists every existing event key, for uniqueness checks.
    async fn list_event_keys(&self) -> AppResult<Vec<EventKey>>;
}

/// Port for the external object store holding event images.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Stores an image under a logical directory and returns its public URL.
    async fn store_image(
        &self,
        name: &str,
        directory: &str,
        image: &ImageUpload,
    ) -> AppResult<String>;

    /// Deletes a stored image. Deleting a missing image is not an error.
    async fn delete_image(&self, name: &str, directory: &str) -> AppResult<()>;
}

#[cfg(test)]
mod tests {
    use super::EventPage;

    #[test]
    fn page_offset_is_zero_based_from_one_based_pages() {
        assert_eq!(EventPage::default().offset(), 0);
        assert_eq!(
            EventPage {
                page: 3,
                page_size: 10
            }
            .offset(),
            20
        );
        assert_eq!(
            EventPage {
                page: 0,
                page_size: 10
            }
            .offset(),
            0
        );
    }
}
