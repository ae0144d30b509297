use std::collections::BTreeSet;
use std::sync::Arc;

use eventdesk_core::{AppError, AppResult, CallerIdentity};
use eventdesk_domain::{Permission, PermissionSet};

use crate::claims::decode_claims;
use crate::identity_ports::IdentityProvider;

/// Derived per-request authorization context.
///
/// Produced once per gated request and attached to it; handlers read the
/// normalized permission set from here and never touch the raw token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedCaller {
    identity: CallerIdentity,
    permissions: PermissionSet,
    stale: bool,
}

impl AuthorizedCaller {
    /// Creates an authorization context, normally from
    /// [`AuthorizationService::authorize_request`].
    #[must_use]
    pub fn new(identity: CallerIdentity, permissions: PermissionSet, stale: bool) -> Self {
        Self {
            identity,
            permissions,
            stale,
        }
    }

    /// Returns the caller identity extracted from the token.
    #[must_use]
    pub fn identity(&self) -> &CallerIdentity {
        &self.identity
    }

    /// Returns the authoritative permission set for this request.
    #[must_use]
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Returns whether the held token no longer matches the live grants.
    #[must_use]
    pub fn stale(&self) -> bool {
        self.stale
    }

    /// Returns a copy with the staleness flag forced to the given value.
    #[must_use]
    pub fn with_staleness(mut self, stale: bool) -> Self {
        self.stale = stale;
        self
    }
}

/// Application service evaluating bearer tokens against the identity
/// provider's live grants.
#[derive(Clone)]
pub struct AuthorizationService {
    identity_provider: Arc<dyn IdentityProvider>,
}

impl AuthorizationService {
    /// Creates a new authorization service from an identity provider port.
    #[must_use]
    pub fn new(identity_provider: Arc<dyn IdentityProvider>) -> Self {
        Self { identity_provider }
    }

    /// Evaluates one inbound bearer token.
    ///
    /// Decodes the token claims, fetches the authoritative grants for the
    /// subject, and flags drift when the two grant-name sets differ in
    /// membership. Drift never fails the request by itself; the caller
    /// proceeds with the authoritative set and the staleness flag is
    /// surfaced so the UI can prompt re-login. Claim decoding and
    /// identity-provider failures propagate and fail the request closed.
    pub async fn authorize_request(&self, token: &str) -> AppResult<AuthorizedCaller> {
        let claims = decode_claims(token)?;

        let granted = self
            .identity_provider
            .permissions_for_subject(claims.sub.as_str())
            .await?;

        // Drift is judged on the raw grant names, not the normalized
        // sets, so a change involving a grant outside the closed
        // enumeration still registers.
        let token_grants: BTreeSet<&str> =
            claims.permissions.iter().map(String::as_str).collect();
        let authoritative_grants: BTreeSet<&str> = granted
            .iter()
            .map(|grant| grant.permission_name.as_str())
            .collect();
        let stale = token_grants != authoritative_grants;

        let authoritative_permissions = PermissionSet::from_transport_values(&authoritative_grants);

        Ok(AuthorizedCaller::new(
            CallerIdentity::new(claims.sub),
            authoritative_permissions,
            stale,
        ))
    }

    /// Ensures the caller holds the required permission.
    ///
    /// The denial message is deliberately opaque: it never names the
    /// missing permission, so the API cannot be used to enumerate grants.
    pub fn require(&self, caller: &AuthorizedCaller, permission: Permission) -> AppResult<()> {
        if caller.permissions().satisfies(&[permission]) {
            return Ok(());
        }

        Err(AppError::Unauthorized(
            "insufficient permissions".to_owned(),
        ))
    }
}
