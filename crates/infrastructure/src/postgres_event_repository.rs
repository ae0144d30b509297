use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eventdesk_application::{EventFilter, EventPage, EventRepository};
use eventdesk_core::{AppError, AppResult, CallerIdentity, EventKey, NonEmptyString};
use eventdesk_domain::{AccessScope, EventRecord, FormField};
use serde_json::Value;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// PostgreSQL-backed repository for persisted events.
#[derive(Clone)]
pub struct PostgresEventRepository {
    pool: PgPool,
}

impl PostgresEventRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const EVENT_COLUMNS: &str = "id, key, owner_subject, name, description, starts_at, ends_at, \
     subscription_count, thumbnail_url, banner_url, fields, additional_fields, \
     created_at, updated_at";

#[derive(Debug, FromRow)]
struct EventRow {
    id: Uuid,
    key: String,
    owner_subject: String,
    name: String,
    description: String,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    subscription_count: i64,
    thumbnail_url: Option<String>,
    banner_url: Option<String>,
    fields: Value,
    additional_fields: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EventRow {
    fn into_record(self) -> AppResult<EventRecord> {
        let key = EventKey::new(self.key)
            .map_err(|error| AppError::Internal(format!("stored event key is invalid: {error}")))?;
        let name = NonEmptyString::new(self.name).map_err(|error| {
            AppError::Internal(format!("stored event name is invalid: {error}"))
        })?;
        let fields = serde_json::from_value::<Vec<FormField>>(self.fields).map_err(|error| {
            AppError::Internal(format!("stored event fields are invalid: {error}"))
        })?;
        let additional_fields = serde_json::from_value::<Vec<FormField>>(self.additional_fields)
            .map_err(|error| {
                AppError::Internal(format!("stored additional fields are invalid: {error}"))
            })?;

        Ok(EventRecord {
            id: self.id,
            key,
            owner: CallerIdentity::new(self.owner_subject),
            name,
            description: self.description,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            subscription_count: self.subscription_count,
            thumbnail_url: self.thumbnail_url,
            banner_url: self.banner_url,
            fields,
            additional_fields,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn fields_json(fields: &[FormField]) -> AppResult<Value> {
    serde_json::to_value(fields)
        .map_err(|error| AppError::Internal(format!("failed to encode form fields: {error}")))
}

fn map_insert_error(error: sqlx::Error, key: &EventKey) -> AppError {
    if let sqlx::Error::Database(database_error) = &error {
        if database_error.is_unique_violation() {
            return AppError::Conflict(format!("event key '{key}' already exists"));
        }
    }

    AppError::Internal(format!("failed to insert event: {error}"))
}

#[async_trait]
impl EventRepository for PostgresEventRepository {
    async fn insert_event(&self, event: EventRecord) -> AppResult<EventRecord> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            INSERT INTO events (
                id, key, owner_subject, name, description, starts_at, ends_at,
                subscription_count, thumbnail_url, banner_url, fields,
                additional_fields, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id, key, owner_subject, name, description, starts_at, ends_at,
                subscription_count, thumbnail_url, banner_url, fields,
                additional_fields, created_at, updated_at
            "#,
        )
        .bind(event.id)
        .bind(event.key.as_str())
        .bind(event.owner.subject())
        .bind(event.name.as_str())
        .bind(event.description.as_str())
        .bind(event.starts_at)
        .bind(event.ends_at)
        .bind(event.subscription_count)
        .bind(event.thumbnail_url.as_deref())
        .bind(event.banner_url.as_deref())
        .bind(fields_json(&event.fields)?)
        .bind(fields_json(&event.additional_fields)?)
        .bind(event.created_at)
        .bind(event.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_insert_error(error, &event.key))?;

        row.into_record()
    }

    async fn list_events(
        &self,
        scope: &AccessScope,
        filter: &EventFilter,
        page: EventPage,
    ) -> AppResult<Vec<EventRecord>> {
        let limit = i64::try_from(page.page_size)
            .map_err(|error| AppError::Validation(format!("invalid page size: {error}")))?;
        let offset = i64::try_from(page.offset())
            .map_err(|error| AppError::Validation(format!("invalid page: {error}")))?;

        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {EVENT_COLUMNS} FROM events WHERE TRUE"));

        if let AccessScope::OwnedBy(owner) = scope {
            builder.push(" AND owner_subject = ");
            builder.push_bind(owner.subject().to_owned());
        }

        if let Some(search) = filter.search.as_deref() {
            let pattern = format!("%{search}%");
            builder.push(" AND (name ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR description ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR key ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }

        if let Some(key) = filter.key.as_ref() {
            builder.push(" AND key = ");
            builder.push_bind(key.as_str().to_owned());
        }
        if let Some(fragment) = filter.name_contains.as_deref() {
            builder.push(" AND name ILIKE ");
            builder.push_bind(format!("%{fragment}%"));
        }
        if let Some(fragment) = filter.description_contains.as_deref() {
            builder.push(" AND description ILIKE ");
            builder.push_bind(format!("%{fragment}%"));
        }
        if let Some(bound) = filter.starts_after {
            builder.push(" AND starts_at >= ");
            builder.push_bind(bound);
        }
        if let Some(bound) = filter.ends_before {
            builder.push(" AND ends_at <= ");
            builder.push_bind(bound);
        }
        if let Some(bound) = filter.created_after {
            builder.push(" AND created_at >= ");
            builder.push_bind(bound);
        }
        if let Some(bound) = filter.updated_after {
            builder.push(" AND updated_at >= ");
            builder.push_bind(bound);
        }

        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let rows = builder
            .build_query_as::<EventRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to list events: {error}")))?;

        rows.into_iter().map(EventRow::into_record).collect()
    }

    async fn find_owned_event(
        &self,
        key: &EventKey,
        owner: &CallerIdentity,
    ) -> AppResult<Option<EventRecord>> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, key, owner_subject, name, description, starts_at, ends_at,
                subscription_count, thumbnail_url, banner_url, fields,
                additional_fields, created_at, updated_at
            FROM events
            WHERE key = $1 AND owner_subject = $2
            "#,
        )
        .bind(key.as_str())
        .bind(owner.subject())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load event '{key}': {error}"))
        })?;

        row.map(EventRow::into_record).transpose()
    }

    async fn update_event(&self, event: EventRecord) -> AppResult<EventRecord> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            UPDATE events
            SET name = $2, description = $3, starts_at = $4, ends_at = $5,
                subscription_count = $6, thumbnail_url = $7, banner_url = $8,
                fields = $9, additional_fields = $10, updated_at = $11
            WHERE key = $1
            RETURNING id, key, owner_subject, name, description, starts_at, ends_at,
                subscription_count, thumbnail_url, banner_url, fields,
                additional_fields, created_at, updated_at
            "#,
        )
        .bind(event.key.as_str())
        .bind(event.name.as_str())
        .bind(event.description.as_str())
        .bind(event.starts_at)
        .bind(event.ends_at)
        .bind(event.subscription_count)
        .bind(event.thumbnail_url.as_deref())
        .bind(event.banner_url.as_deref())
        .bind(fields_json(&event.fields)?)
        .bind(fields_json(&event.additional_fields)?)
        .bind(event.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to update event '{}': {error}", event.key))
        })?
        .ok_or_else(|| AppError::NotFound(format!("event '{}' not found", event.key)))?;

        row.into_record()
    }

    async fn delete_event(&self, key: &EventKey) -> AppResult<()> {
        sqlx::query("DELETE FROM events WHERE key = $1")
            .bind(key.as_str())
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete event '{key}': {error}"))
            })?;

        Ok(())
    }

    async fn list_event_keys(&self) -> AppResult<Vec<EventKey>> {
        #[derive(Debug, FromRow)]
        struct KeyRow {
            key: String,
        }

        let rows = sqlx::query_as::<_, KeyRow>("SELECT key FROM events")
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to list event keys: {error}")))?;

        rows.into_iter()
            .map(|row| {
                EventKey::new(row.key).map_err(|error| {
                    AppError::Internal(format!("stored event key is invalid: {error}"))
                })
            })
            .collect()
    }
}
