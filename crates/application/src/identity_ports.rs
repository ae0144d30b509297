use async_trait::async_trait;
use eventdesk_core::AppResult;

/// One role that grants a permission, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSource {
    /// Stable role identifier.
    pub source_id: String,
    /// Human-readable role name (e.g. `admin`, `company`).
    pub source_name: String,
    /// Source kind reported by the provider; `ROLE` for role grants.
    pub source_type: String,
}

/// Authoritative permission grant resolved for a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantedPermission {
    /// Transport identifier of the permission (e.g. `create:events`).
    pub permission_name: String,
    /// Provider-side description of the permission.
    pub description: Option<String>,
    /// Identifier of the resource server the permission belongs to.
    pub resource_server_identifier: Option<String>,
    /// Roles through which the subject holds this permission.
    pub sources: Vec<RoleSource>,
}

/// Account changes pushed to the provider-side user record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    /// Free-form user metadata stored on the account.
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    /// Public URL of the account's profile picture.
    pub picture_url: Option<String>,
}

/// Port for the external identity provider's management API.
///
/// Implementations obtain their own service-to-service credential; a
/// failure anywhere in the exchange surfaces as
/// [`eventdesk_core::AppError::UpstreamAuthority`] so gated requests fail
/// closed instead of degrading to token-only trust.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Fetches the current, ground-truth permission grants for a subject.
    async fn permissions_for_subject(&self, subject: &str) -> AppResult<Vec<GrantedPermission>>;

    /// Applies account changes to the subject's user record.
    async fn update_user_profile(&self, subject: &str, update: &ProfileUpdate) -> AppResult<()>;
}
