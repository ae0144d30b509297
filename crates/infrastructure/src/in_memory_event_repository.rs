use async_trait::async_trait;
use eventdesk_application::{EventFilter, EventPage, EventRepository};
use eventdesk_core::{AppError, AppResult, CallerIdentity, EventKey};
use eventdesk_domain::{AccessScope, EventRecord};
use tokio::sync::Mutex;

/// In-memory event repository for tests and local development.
#[derive(Default)]
pub struct InMemoryEventRepository {
    events: Mutex<Vec<EventRecord>>,
}

impl InMemoryEventRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches_filter(event: &EventRecord, filter: &EventFilter) -> bool {
    if let Some(search) = filter.search.as_deref() {
        let hit = contains_ignore_case(event.name.as_str(), search)
            || contains_ignore_case(&event.description, search)
            || contains_ignore_case(event.key.as_str(), search);
        if !hit {
            return false;
        }
    }

    if let Some(key) = filter.key.as_ref() {
        if &event.key != key {
            return false;
        }
    }
    if let Some(fragment) = filter.name_contains.as_deref() {
        if !contains_ignore_case(event.name.as_str(), fragment) {
            return false;
        }
    }
    if let Some(fragment) = filter.description_contains.as_deref() {
        if !contains_ignore_case(&event.description, fragment) {
            return false;
        }
    }
    if let Some(bound) = filter.starts_after {
        if event.starts_at < bound {
            return false;
        }
    }
    if let Some(bound) = filter.ends_before {
        if event.ends_at > bound {
            return false;
        }
    }
    if let Some(bound) = filter.created_after {
        if event.created_at < bound {
            return false;
        }
    }
    if let Some(bound) = filter.updated_after {
        if event.updated_at < bound {
            return false;
        }
    }

    true
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn insert_event(&self, event: EventRecord) -> AppResult<EventRecord> {
        let mut events = self.events.lock().await;
        if events.iter().any(|stored| stored.key == event.key) {
            return Err(AppError::Conflict(format!(
                "event key '{}' already exists",
                event.key
            )));
        }

        events.push(event.clone());
        Ok(event)
    }

    async fn list_events(
        &self,
        scope: &AccessScope,
        filter: &EventFilter,
        page: EventPage,
    ) -> AppResult<Vec<EventRecord>> {
        let events = self.events.lock().await;
        let mut visible: Vec<EventRecord> = events
            .iter()
            .filter(|event| match scope {
                AccessScope::AllOwners => true,
                AccessScope::OwnedBy(owner) => &event.owner == owner,
            })
            .filter(|event| matches_filter(event, filter))
            .cloned()
            .collect();

        visible.sort_by(|left, right| right.created_at.cmp(&left.created_at));

        Ok(visible
            .into_iter()
            .skip(page.offset())
            .take(page.page_size)
            .collect())
    }

    async fn find_owned_event(
        &self,
        key: &EventKey,
        owner: &CallerIdentity,
    ) -> AppResult<Option<EventRecord>> {
        let events = self.events.lock().await;
        Ok(events
            .iter()
            .find(|event| &event.key == key && &event.owner == owner)
            .cloned())
    }

    async fn update_event(&self, event: EventRecord) -> AppResult<EventRecord> {
        let mut events = self.events.lock().await;
        let Some(slot) = events.iter_mut().find(|stored| stored.key == event.key) else {
            return Err(AppError::NotFound(format!(
                "event '{}' not found",
                event.key
            )));
        };

        *slot = event.clone();
        Ok(event)
    }

    async fn delete_event(&self, key: &EventKey) -> AppResult<()> {
        let mut events = self.events.lock().await;
        events.retain(|event| &event.key != key);
        Ok(())
    }

    async fn list_event_keys(&self) -> AppResult<Vec<EventKey>> {
        let events = self.events.lock().await;
        Ok(events.iter().map(|event| event.key.clone()).collect())
    }
}
