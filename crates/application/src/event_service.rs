use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use eventdesk_core::{AppError, AppResult, EventKey};
use eventdesk_domain::{EventRecord, Permission};
use uuid::Uuid;

use crate::authorization_service::{AuthorizationService, AuthorizedCaller};
use crate::event_key::generate_unique_key;
use crate::event_ports::{
    EventFilter, EventPage, EventRepository, EventUpdate, ImageStore, ImageUpload, NewEvent,
};

#[cfg(test)]
mod tests;

/// Logical object-store directory for event images.
const IMAGE_DIRECTORY: &str = "user-details/events";

/// Application service for event CRUD behind the request gate.
///
/// Every operation checks permissions before touching the repository or
/// the image store, so an unauthorized request never causes a read, a
/// write, an upload, or a delete.
#[derive(Clone)]
pub struct EventService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn EventRepository>,
    image_store: Arc<dyn ImageStore>,
}

impl EventService {
    /// Creates an event service from its ports.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn EventRepository>,
        image_store: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            image_store,
        }
    }

    /// Creates an event owned by the caller.
    pub async fn create_event(
        &self,
        caller: &AuthorizedCaller,
        input: NewEvent,
    ) -> AppResult<EventRecord> {
        self.authorization_service
            .require(caller, Permission::CreateEvents)?;

        let existing_keys: BTreeSet<EventKey> =
            self.repository.list_event_keys().await?.into_iter().collect();
        let key = generate_unique_key(&existing_keys)?;

        let thumbnail_url = self
            .store_optional_image("thumbnail", &key, input.thumbnail.as_ref())
            .await?;
        let banner_url = self
            .store_optional_image("banner", &key, input.banner.as_ref())
            .await?;

        let now = Utc::now();
        let event = EventRecord {
            id: Uuid::new_v4(),
            key,
            owner: caller.identity().clone(),
            name: input.name,
            description: input.description,
            starts_at: input.starts_at,
            ends_at: input.ends_at,
            subscription_count: 0,
            thumbnail_url,
            banner_url,
            fields: input.fields,
            additional_fields: input.additional_fields,
            created_at: now,
            updated_at: now,
        };

        self.repository.insert_event(event).await
    }

    /// Lists events visible to the caller.
    ///
    /// Elevated callers see every owner's events; standard callers only
    /// their own. Callers holding neither read permission are denied.
    pub async fn list_events(
        &self,
        caller: &AuthorizedCaller,
        filter: &EventFilter,
        page: EventPage,
    ) -> AppResult<Vec<EventRecord>> {
        let scope = caller
            .permissions()
            .read_scope(caller.identity())
            .ok_or_else(|| AppError::Unauthorized("insufficient permissions".to_owned()))?;

        self.repository.list_events(&scope, filter, page).await
    }

    /// Updates an event owned by the caller.
    ///
    /// An event owned by someone else is indistinguishable from a missing
    /// one: both surface as not-found.
    pub async fn update_event(
        &self,
        caller: &AuthorizedCaller,
        key: &EventKey,
        update: EventUpdate,
    ) -> AppResult<EventRecord> {
        self.authorization_service
            .require(caller, Permission::UpdateEvents)?;

        let mut event = self
            .repository
            .find_owned_event(key, caller.identity())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("event '{key}' not found")))?;

        if let Some(url) = self
            .store_optional_image("thumbnail", key, update.thumbnail.as_ref())
            .await?
        {
            event.thumbnail_url = Some(url);
        }
        if let Some(url) = self
            .store_optional_image("banner", key, update.banner.as_ref())
            .await?
        {
            event.banner_url = Some(url);
        }

        if let Some(name) = update.name {
            event.name = name;
        }
        if let Some(description) = update.description {
            event.description = description;
        }
        if let Some(starts_at) = update.starts_at {
            event.starts_at = starts_at;
        }
        if let Some(ends_at) = update.ends_at {
            event.ends_at = ends_at;
        }
        if let Some(fields) = update.fields {
            event.fields = fields;
        }
        if let Some(additional_fields) = update.additional_fields {
            event.additional_fields = additional_fields;
        }
        event.updated_at = Utc::now();

        self.repository.update_event(event).await
    }

    /// Deletes an event owned by the caller, including its stored images.
    pub async fn delete_event(&self, caller: &AuthorizedCaller, key: &EventKey) -> AppResult<()> {
        self.authorization_service
            .require(caller, Permission::DeleteEvents)?;

        let event = self
            .repository
            .find_owned_event(key, caller.identity())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("event '{key}' not found")))?;

        self.image_store
            .delete_image(&image_name("thumbnail", &event.key), IMAGE_DIRECTORY)
            .await?;
        self.image_store
            .delete_image(&image_name("banner", &event.key), IMAGE_DIRECTORY)
            .await?;

        self.repository.delete_event(&event.key).await
    }

    async fn store_optional_image(
        &self,
        role: &str,
        key: &EventKey,
        image: Option<&ImageUpload>,
    ) -> AppResult<Option<String>> {
        let Some(image) = image else {
            return Ok(None);
        };

        let url = self
            .image_store
            .store_image(&image_name(role, key), IMAGE_DIRECTORY, image)
            .await?;

        Ok(Some(url))
    }
}

fn image_name(role: &str, key: &EventKey) -> String {
    format!("{role}-{key}")
}
