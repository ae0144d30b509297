use chrono::{DateTime, Utc};
use eventdesk_core::{CallerIdentity, EventKey, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Input widget backing a custom verification form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free-text input.
    TextField,
    /// Single check box.
    CheckBox,
    /// Mutually exclusive option group.
    RadioGroup,
}

impl FieldKind {
    /// Returns the stable storage value for this field kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextField => "text_field",
            Self::CheckBox => "check_box",
            Self::RadioGroup => "radio_group",
        }
    }
}

/// One custom form field definition embedded in an event.
///
/// Options are only meaningful for option-bearing kinds and stay empty
/// for plain text fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    /// Input widget kind.
    pub kind: FieldKind,
    /// Label shown to subscribers.
    pub label: String,
    /// Ordered options for option-bearing kinds.
    #[serde(default)]
    pub options: Vec<String>,
}

/// An event listing owned by exactly one caller identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Internal identifier; never exposed through the API.
    pub id: Uuid,
    /// External addressing key, unique across all events.
    pub key: EventKey,
    /// Identity that created the event. Immutable after creation.
    pub owner: CallerIdentity,
    /// Display name of the event.
    pub name: NonEmptyString,
    /// Long-form description.
    pub description: String,
    /// Start of the event window.
    pub starts_at: DateTime<Utc>,
    /// End of the event window.
    pub ends_at: DateTime<Utc>,
    /// Number of recorded subscriptions.
    pub subscription_count: i64,
    /// Public URL of the stored thumbnail image, if any.
    pub thumbnail_url: Option<String>,
    /// Public URL of the stored banner image, if any.
    pub banner_url: Option<String>,
    /// Ordered default verification fields enabled for this event.
    pub fields: Vec<FormField>,
    /// Ordered custom verification fields added by the owner.
    pub additional_fields: Vec<FormField>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::{FieldKind, FormField};

    #[test]
    fn field_kind_storage_values_are_stable() {
        assert_eq!(FieldKind::TextField.as_str(), "text_field");
        assert_eq!(FieldKind::CheckBox.as_str(), "check_box");
        assert_eq!(FieldKind::RadioGroup.as_str(), "radio_group");
    }

    #[test]
    fn form_field_options_default_to_empty_on_deserialize() {
        let parsed = serde_json::from_str::<FormField>(
            r#"{"kind": "text_field", "label": "Full Name"}"#,
        );
        assert!(parsed.is_ok());
        assert!(parsed.map(|field| field.options.is_empty()).unwrap_or(false));
    }
}
