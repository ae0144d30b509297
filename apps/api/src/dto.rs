use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use eventdesk_application::ImageUpload;
use eventdesk_core::{AppError, AppResult};
use eventdesk_domain::{EventRecord, FormField};
use serde::{Deserialize, Serialize};

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Session status surfaced to the portal shell.
#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    /// Whether the caller passed the gate.
    pub authenticated: bool,
    /// Whether the held token has drifted from the live grants and the
    /// portal should prompt a fresh login.
    pub re_authentication_required: bool,
}

/// Query parameters accepted by the event listing endpoint.
#[derive(Debug, Deserialize)]
pub struct EventListQuery {
    pub search: Option<String>,
    pub key: Option<String>,
    pub event_name: Option<String>,
    pub description: Option<String>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// Request payload for creating an event.
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub event_name: String,
    #[serde(default)]
    pub description: String,
    pub from_date_time: DateTime<Utc>,
    pub to_date_time: DateTime<Utc>,
    #[serde(default)]
    pub fields: Vec<FormField>,
    #[serde(default)]
    pub additional_fields: Vec<FormField>,
    /// `data:` URL of the thumbnail image.
    pub thumbnail: Option<String>,
    /// `data:` URL of the banner image.
    pub banner: Option<String>,
}

/// Request payload for updating an event, addressed by key.
#[derive(Debug, Deserialize)]
pub struct UpdateEventRequest {
    pub key: String,
    pub event_name: Option<String>,
    pub description: Option<String>,
    pub from_date_time: Option<DateTime<Utc>>,
    pub to_date_time: Option<DateTime<Utc>>,
    pub fields: Option<Vec<FormField>>,
    pub additional_fields: Option<Vec<FormField>>,
    pub thumbnail: Option<String>,
    pub banner: Option<String>,
}

/// Request payload for updating the caller's account profile.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    /// Replacement user metadata, if changing.
    pub user_metadata: Option<serde_json::Map<String, serde_json::Value>>,
    /// `data:` URL of the profile picture, if changing.
    pub picture: Option<String>,
}

/// Request payload for deleting an event.
#[derive(Debug, Deserialize)]
pub struct DeleteEventRequest {
    pub key: String,
}

/// API representation of an event.
#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub key: String,
    /// Owner subject; only present for elevated-tier callers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub event_name: String,
    pub description: String,
    pub from_date_time: DateTime<Utc>,
    pub to_date_time: DateTime<Utc>,
    pub subscription_count: i64,
    pub fields: Vec<FormField>,
    pub additional_fields: Vec<FormField>,
    pub thumbnail: Option<String>,
    pub banner: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventResponse {
    /// Converts a record, optionally exposing the owner identity.
    #[must_use]
    pub fn from_record(record: EventRecord, include_owner: bool) -> Self {
        Self {
            key: record.key.to_string(),
            user_id: include_owner.then(|| record.owner.subject().to_owned()),
            event_name: record.name.as_str().to_owned(),
            description: record.description,
            from_date_time: record.starts_at,
            to_date_time: record.ends_at,
            subscription_count: record.subscription_count,
            fields: record.fields,
            additional_fields: record.additional_fields,
            thumbnail: record.thumbnail_url,
            banner: record.banner_url,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Decodes a `data:<mime>;base64,<payload>` URL into an image upload.
pub fn parse_data_url(value: &str) -> AppResult<ImageUpload> {
    let rest = value
        .strip_prefix("data:")
        .ok_or_else(|| AppError::Validation("image must be a data URL".to_owned()))?;

    let (content_type, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| AppError::Validation("image data URL must be base64-encoded".to_owned()))?;

    let bytes = STANDARD
        .decode(payload)
        .map_err(|error| AppError::Validation(format!("image payload is not base64: {error}")))?;

    Ok(ImageUpload {
        bytes,
        content_type: content_type.to_owned(),
    })
}

/// Decodes an optional data URL field.
pub fn parse_optional_data_url(value: Option<&str>) -> AppResult<Option<ImageUpload>> {
    value.map(parse_data_url).transpose()
}
