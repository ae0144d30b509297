use chrono::{DateTime, Duration, Utc};
use eventdesk_application::{GrantedPermission, IdentityProvider, ProfileUpdate, RoleSource};
use eventdesk_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::warn;
use url::Url;

use async_trait::async_trait;

/// Safety margin subtracted from the provider-reported credential lifetime.
const CREDENTIAL_EXPIRY_MARGIN_SECONDS: i64 = 30;

/// Connection settings for the identity provider's management API.
#[derive(Debug, Clone)]
pub struct IdentityProviderConfig {
    /// Issuer base URL (e.g. `https://tenant.example.auth0.com`).
    pub issuer_base_url: String,
    /// Client id of the machine-to-machine application.
    pub client_id: String,
    /// Client secret of the machine-to-machine application.
    pub client_secret: String,
    /// Audience of the management API.
    pub audience: String,
}

struct CachedCredential {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Identity provider adapter backed by the management HTTP API.
///
/// The service credential obtained through the client-credentials
/// exchange is cached and replaced wholesale on refresh; concurrent
/// requests may race the refresh, which at worst performs one redundant
/// idempotent exchange.
pub struct HttpIdentityProvider {
    http_client: reqwest::Client,
    config: IdentityProviderConfig,
    cached_credential: RwLock<Option<CachedCredential>>,
}

#[derive(Debug, Serialize)]
struct CredentialRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    audience: &'a str,
    grant_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct CredentialResponse {
    access_token: String,
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct PermissionEntry {
    permission_name: String,
    description: Option<String>,
    resource_server_identifier: Option<String>,
    #[serde(default)]
    sources: Vec<SourceEntry>,
}

#[derive(Debug, Serialize)]
struct ProfilePatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    user_metadata: Option<&'a serde_json::Map<String, serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    picture: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct SourceEntry {
    source_id: String,
    source_name: String,
    source_type: String,
}

impl HttpIdentityProvider {
    /// Creates a provider adapter from an HTTP client and settings.
    #[must_use]
    pub fn new(http_client: reqwest::Client, config: IdentityProviderConfig) -> Self {
        Self {
            http_client,
            config,
            cached_credential: RwLock::new(None),
        }
    }

    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> AppResult<Url> {
        let mut url = Url::parse(self.config.issuer_base_url.as_str()).map_err(|error| {
            AppError::UpstreamAuthority(format!("invalid issuer base URL: {error}"))
        })?;

        url.path_segments_mut()
            .map_err(|()| {
                AppError::UpstreamAuthority("issuer base URL cannot carry a path".to_owned())
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn service_token(&self) -> AppResult<String> {
        {
            let cached = self.cached_credential.read().await;
            if let Some(credential) = cached.as_ref() {
                if credential.expires_at > Utc::now() {
                    return Ok(credential.access_token.clone());
                }
            }
        }

        let endpoint = self.endpoint(["oauth", "token"])?;
        let response = self
            .http_client
            .post(endpoint)
            .json(&CredentialRequest {
                client_id: self.config.client_id.as_str(),
                client_secret: self.config.client_secret.as_str(),
                audience: self.config.audience.as_str(),
                grant_type: "client_credentials",
            })
            .send()
            .await
            .map_err(|error| {
                warn!(error = %error, "service credential exchange failed");
                AppError::UpstreamAuthority(format!("credential exchange transport error: {error}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(%status, "service credential exchange rejected");
            return Err(AppError::UpstreamAuthority(format!(
                "credential exchange failed with status {status}"
            )));
        }

        let credential = response.json::<CredentialResponse>().await.map_err(|error| {
            AppError::UpstreamAuthority(format!("credential exchange returned invalid JSON: {error}"))
        })?;

        let lifetime = credential
            .expires_in
            .unwrap_or(CREDENTIAL_EXPIRY_MARGIN_SECONDS)
            .saturating_sub(CREDENTIAL_EXPIRY_MARGIN_SECONDS)
            .max(0);
        let expires_at = Utc::now() + Duration::seconds(lifetime);

        let mut cached = self.cached_credential.write().await;
        *cached = Some(CachedCredential {
            access_token: credential.access_token.clone(),
            expires_at,
        });

        Ok(credential.access_token)
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn permissions_for_subject(&self, subject: &str) -> AppResult<Vec<GrantedPermission>> {
        let access_token = self.service_token().await?;
        let endpoint = self.endpoint(["api", "v2", "users", subject, "permissions"])?;

        let response = self
            .http_client
            .get(endpoint)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|error| {
                warn!(error = %error, "permission lookup failed");
                AppError::UpstreamAuthority(format!("permission lookup transport error: {error}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(%status, "permission lookup rejected");
            return Err(AppError::UpstreamAuthority(format!(
                "permission lookup failed with status {status}"
            )));
        }

        let entries = response.json::<Vec<PermissionEntry>>().await.map_err(|error| {
            AppError::UpstreamAuthority(format!("permission lookup returned invalid JSON: {error}"))
        })?;

        Ok(entries
            .into_iter()
            .map(|entry| GrantedPermission {
                permission_name: entry.permission_name,
                description: entry.description,
                resource_server_identifier: entry.resource_server_identifier,
                sources: entry
                    .sources
                    .into_iter()
                    .map(|source| RoleSource {
                        source_id: source.source_id,
                        source_name: source.source_name,
                        source_type: source.source_type,
                    })
                    .collect(),
            })
            .collect())
    }

    async fn update_user_profile(&self, subject: &str, update: &ProfileUpdate) -> AppResult<()> {
        let access_token = self.service_token().await?;
        let endpoint = self.endpoint(["api", "v2", "users", subject])?;

        let response = self
            .http_client
            .patch(endpoint)
            .bearer_auth(access_token)
            .json(&ProfilePatch {
                user_metadata: update.metadata.as_ref(),
                picture: update.picture_url.as_deref(),
            })
            .send()
            .await
            .map_err(|error| {
                warn!(error = %error, "profile update failed");
                AppError::UpstreamAuthority(format!("profile update transport error: {error}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(%status, "profile update rejected");
            return Err(AppError::UpstreamAuthority(format!(
                "profile update failed with status {status}"
            )));
        }

        Ok(())
    }
}
