use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use eventdesk_core::{AppError, AppResult, CallerIdentity, EventKey, NonEmptyString};
use eventdesk_domain::{AccessScope, EventRecord, PermissionSet};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::authorization_service::{AuthorizationService, AuthorizedCaller};
use crate::event_ports::{
    EventFilter, EventPage, EventRepository, EventUpdate, ImageStore, ImageUpload, NewEvent,
};
use crate::identity_ports::{GrantedPermission, IdentityProvider, ProfileUpdate};

use super::EventService;

struct NoopIdentityProvider;

#[async_trait]
impl IdentityProvider for NoopIdentityProvider {
    async fn permissions_for_subject(&self, _subject: &str) -> AppResult<Vec<GrantedPermission>> {
        Ok(Vec::new())
    }

    async fn update_user_profile(&self, _subject: &str, _update: &ProfileUpdate) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
struct FakeEventRepository {
    events: Mutex<Vec<EventRecord>>,
    mutation_count: Mutex<usize>,
}

impl FakeEventRepository {
    async fn seed(&self, event: EventRecord) {
        self.events.lock().await.push(event);
    }

    async fn mutations(&self) -> usize {
        *self.mutation_count.lock().await
    }

    async fn record_mutation(&self) {
        *self.mutation_count.lock().await += 1;
    }
}

#[async_trait]
impl EventRepository for FakeEventRepository {
    async fn insert_event(&self, event: EventRecord) -> AppResult<EventRecord> {
        self.record_mutation().await;
        self.events.lock().await.push(event.clone());
        Ok(event)
    }

    async fn list_events(
        &self,
        scope: &AccessScope,
        _filter: &EventFilter,
        _page: EventPage,
    ) -> AppResult<Vec<EventRecord>> {
        let events = self.events.lock().await;
        Ok(events
            .iter()
            .filter(|event| match scope {
                AccessScope::AllOwners => true,
                AccessScope::OwnedBy(owner) => &event.owner == owner,
            })
            .cloned()
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
        self.record_mutation().await;
        let mut events = self.events.lock().await;
        let Some(slot) = events.iter_mut().find(|stored| stored.key == event.key) else {
            return Err(AppError::NotFound(format!("event '{}' not found", event.key)));
        };
        *slot = event.clone();
        Ok(event)
    }

    async fn delete_event(&self, key: &EventKey) -> AppResult<()> {
        self.record_mutation().await;
        self.events.lock().await.retain(|event| &event.key != key);
        Ok(())
    }

    async fn list_event_keys(&self) -> AppResult<Vec<EventKey>> {
        let events = self.events.lock().await;
        Ok(events.iter().map(|event| event.key.clone()).collect())
    }
}

#[derive(Default)]
struct FakeImageStore {
    stored: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageStore for FakeImageStore {
    async fn store_image(
        &self,
        name: &str,
        directory: &str,
        _image: &ImageUpload,
    ) -> AppResult<String> {
        self.stored.lock().await.push(name.to_owned());
        Ok(format!("https://images.example/{directory}/{name}"))
    }

    async fn delete_image(&self, name: &str, _directory: &str) -> AppResult<()> {
        self.deleted.lock().await.push(name.to_owned());
        Ok(())
    }
}

struct Fixture {
    service: EventService,
    repository: Arc<FakeEventRepository>,
    image_store: Arc<FakeImageStore>,
}

fn fixture() -> Fixture {
    let repository = Arc::new(FakeEventRepository::default());
    let image_store = Arc::new(FakeImageStore::default());
    let service = EventService::new(
        AuthorizationService::new(Arc::new(NoopIdentityProvider)),
        repository.clone(),
        image_store.clone(),
    );

    Fixture {
        service,
        repository,
        image_store,
    }
}

fn caller_with(permissions: &[&str]) -> AuthorizedCaller {
    AuthorizedCaller::new(
        CallerIdentity::new("auth0|company-1"),
        PermissionSet::from_transport_values(permissions),
        false,
    )
}

fn other_caller_with(permissions: &[&str]) -> AuthorizedCaller {
    AuthorizedCaller::new(
        CallerIdentity::new("auth0|company-2"),
        PermissionSet::from_transport_values(permissions),
        false,
    )
}

fn event_name(value: &str) -> NonEmptyString {
    match NonEmptyString::new(value) {
        Ok(name) => name,
        Err(error) => panic!("test event name should validate: {error}"),
    }
}

fn new_event(name: &str) -> NewEvent {
    NewEvent {
        name: event_name(name),
        description: "annual verification drive".to_owned(),
        starts_at: Utc::now(),
        ends_at: Utc::now(),
        fields: Vec::new(),
        additional_fields: Vec::new(),
        thumbnail: Some(ImageUpload {
            bytes: vec![1, 2, 3],
            content_type: "image/png".to_owned(),
        }),
        banner: Some(ImageUpload {
            bytes: vec![4, 5, 6],
            content_type: "image/png".to_owned(),
        }),
    }
}

fn seeded_event(key: &str, owner: &str) -> EventRecord {
    let now = Utc::now();
    let key = match EventKey::new(key) {
        Ok(key) => key,
        Err(error) => panic!("test event key should validate: {error}"),
    };

    EventRecord {
        id: Uuid::new_v4(),
        key,
        owner: CallerIdentity::new(owner),
        name: event_name("seeded"),
        description: "seeded event".to_owned(),
        starts_at: now,
        ends_at: now,
        subscription_count: 0,
        thumbnail_url: None,
        banner_url: None,
        fields: Vec::new(),
        additional_fields: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn create_records_caller_as_owner_and_stores_images() {
    let fixture = fixture();
    let caller = caller_with(&["create:events"]);

    let created = fixture.service.create_event(&caller, new_event("expo")).await;

    match created {
        Ok(event) => {
            assert_eq!(event.owner, CallerIdentity::new("auth0|company-1"));
            assert_eq!(event.subscription_count, 0);
            assert!(event.thumbnail_url.is_some());
            assert!(event.banner_url.is_some());

            let stored = fixture.image_store.stored.lock().await;
            assert_eq!(stored.len(), 2);
            assert!(stored[0].starts_with("thumbnail-"));
            assert!(stored[1].starts_with("banner-"));
        }
        Err(error) => panic!("create should succeed: {error}"),
    }
}

#[tokio::test]
async fn create_without_permission_touches_nothing() {
    let fixture = fixture();
    let caller = caller_with(&["get:events"]);

    let created = fixture.service.create_event(&caller, new_event("expo")).await;

    assert!(matches!(created, Err(AppError::Unauthorized(_))));
    assert_eq!(fixture.repository.mutations().await, 0);
    assert!(fixture.image_store.stored.lock().await.is_empty());
}

#[tokio::test]
async fn standard_tier_lists_only_owned_events() {
    let fixture = fixture();
    fixture
        .repository
        .seed(seeded_event("aaaaaaaaaaaaaaaaaaaa", "auth0|company-1"))
        .await;
    fixture
        .repository
        .seed(seeded_event("bbbbbbbbbbbbbbbbbbbb", "auth0|company-2"))
        .await;

    let listed = fixture
        .service
        .list_events(&caller_with(&["get:events"]), &EventFilter::default(), EventPage::default())
        .await;

    match listed {
        Ok(events) => {
            assert_eq!(events.len(), 1);
            assert!(events
                .iter()
                .all(|event| event.owner == CallerIdentity::new("auth0|company-1")));
        }
        Err(error) => panic!("list should succeed: {error}"),
    }
}

#[tokio::test]
async fn elevated_tier_lists_events_across_owners() {
    let fixture = fixture();
    fixture
        .repository
        .seed(seeded_event("aaaaaaaaaaaaaaaaaaaa", "auth0|company-1"))
        .await;
    fixture
        .repository
        .seed(seeded_event("bbbbbbbbbbbbbbbbbbbb", "auth0|company-2"))
        .await;

    let listed = fixture
        .service
        .list_events(
            &other_caller_with(&["get:all-events"]),
            &EventFilter::default(),
            EventPage::default(),
        )
        .await;

    assert!(listed.map(|events| events.len() == 2).unwrap_or(false));
}

#[tokio::test]
async fn listing_without_read_permission_is_denied() {
    let fixture = fixture();

    let listed = fixture
        .service
        .list_events(&caller_with(&["create:events"]), &EventFilter::default(), EventPage::default())
        .await;

    assert!(matches!(listed, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn updating_someone_elses_event_reads_as_not_found() {
    let fixture = fixture();
    fixture
        .repository
        .seed(seeded_event("aaaaaaaaaaaaaaaaaaaa", "auth0|company-2"))
        .await;

    let key = match EventKey::new("aaaaaaaaaaaaaaaaaaaa") {
        Ok(key) => key,
        Err(error) => panic!("test event key should validate: {error}"),
    };
    let updated = fixture
        .service
        .update_event(&caller_with(&["update:events"]), &key, EventUpdate::default())
        .await;

    assert!(matches!(updated, Err(AppError::NotFound(_))));
    assert_eq!(fixture.repository.mutations().await, 0);
}

#[tokio::test]
async fn update_preserves_key_and_owner() {
    let fixture = fixture();
    fixture
        .repository
        .seed(seeded_event("aaaaaaaaaaaaaaaaaaaa", "auth0|company-1"))
        .await;

    let key = match EventKey::new("aaaaaaaaaaaaaaaaaaaa") {
        Ok(key) => key,
        Err(error) => panic!("test event key should validate: {error}"),
    };
    let updated = fixture
        .service
        .update_event(
            &caller_with(&["update:events"]),
            &key,
            EventUpdate {
                description: Some("revised".to_owned()),
                ..EventUpdate::default()
            },
        )
        .await;

    match updated {
        Ok(event) => {
            assert_eq!(event.key, key);
            assert_eq!(event.owner, CallerIdentity::new("auth0|company-1"));
            assert_eq!(event.description, "revised");
        }
        Err(error) => panic!("update should succeed: {error}"),
    }
}

#[tokio::test]
async fn update_without_permission_is_rejected_before_lookup() {
    let fixture = fixture();
    fixture
        .repository
        .seed(seeded_event("aaaaaaaaaaaaaaaaaaaa", "auth0|company-1"))
        .await;

    let key = match EventKey::new("aaaaaaaaaaaaaaaaaaaa") {
        Ok(key) => key,
        Err(error) => panic!("test event key should validate: {error}"),
    };
    let updated = fixture
        .service
        .update_event(&caller_with(&["get:events"]), &key, EventUpdate::default())
        .await;

    assert!(matches!(updated, Err(AppError::Unauthorized(_))));
    assert_eq!(fixture.repository.mutations().await, 0);
}

#[tokio::test]
async fn delete_removes_record_and_both_images() {
    let fixture = fixture();
    fixture
        .repository
        .seed(seeded_event("aaaaaaaaaaaaaaaaaaaa", "auth0|company-1"))
        .await;

    let key = match EventKey::new("aaaaaaaaaaaaaaaaaaaa") {
        Ok(key) => key,
        Err(error) => panic!("test event key should validate: {error}"),
    };
    let deleted = fixture
        .service
        .delete_event(&caller_with(&["delete:events"]), &key)
        .await;

    assert!(deleted.is_ok());
    assert!(fixture.repository.events.lock().await.is_empty());

    let deleted_images = fixture.image_store.deleted.lock().await;
    assert_eq!(
        deleted_images.as_slice(),
        [
            "thumbnail-aaaaaaaaaaaaaaaaaaaa".to_owned(),
            "banner-aaaaaaaaaaaaaaaaaaaa".to_owned(),
        ]
    );
}

#[tokio::test]
async fn delete_without_ownership_leaves_everything_in_place() {
    let fixture = fixture();
    fixture
        .repository
        .seed(seeded_event("aaaaaaaaaaaaaaaaaaaa", "auth0|company-2"))
        .await;

    let key = match EventKey::new("aaaaaaaaaaaaaaaaaaaa") {
        Ok(key) => key,
        Err(error) => panic!("test event key should validate: {error}"),
    };
    let deleted = fixture
        .service
        .delete_event(&caller_with(&["delete:events"]), &key)
        .await;

    assert!(matches!(deleted, Err(AppError::NotFound(_))));
    assert_eq!(fixture.repository.events.lock().await.len(), 1);
    assert!(fixture.image_store.deleted.lock().await.is_empty());
}
