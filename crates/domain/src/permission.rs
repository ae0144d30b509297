use std::collections::BTreeSet;
use std::str::FromStr;

use eventdesk_core::{AppError, CallerIdentity};
use serde::{Deserialize, Serialize};

/// Permissions enforced by the request gate.
///
/// The enumeration is closed: transport values outside this set are inert
/// and never satisfy a required permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Allows creating events.
    CreateEvents,
    /// Allows reading events owned by the caller.
    GetEvents,
    /// Allows reading events across all owners.
    GetAllEvents,
    /// Allows updating events owned by the caller.
    UpdateEvents,
    /// Allows deleting events owned by the caller.
    DeleteEvents,
}

impl Permission {
    /// Returns the stable transport value for this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateEvents => "create:events",
            Self::GetEvents => "get:events",
            Self::GetAllEvents => "get:all-events",
            Self::UpdateEvents => "update:events",
            Self::DeleteEvents => "delete:events",
        }
    }

    /// Returns all known permissions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Permission] = &[
            Permission::CreateEvents,
            Permission::GetEvents,
            Permission::GetAllEvents,
            Permission::UpdateEvents,
            Permission::DeleteEvents,
        ];

        ALL
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "create:events" => Ok(Self::CreateEvents),
            "get:events" => Ok(Self::GetEvents),
            "get:all-events" => Ok(Self::GetAllEvents),
            "update:events" => Ok(Self::UpdateEvents),
            "delete:events" => Ok(Self::DeleteEvents),
            _ => Err(AppError::Validation(format!(
                "unknown permission value '{value}'"
            ))),
        }
    }
}

/// Caller tier derived from which read permission is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessTier {
    /// Holds `get:all-events`; sees resources across all owners.
    Elevated,
    /// Holds `get:events`; restricted to owned resources.
    Standard,
}

/// Data-visibility filter produced by the authorization policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessScope {
    /// No ownership filter is applied.
    AllOwners,
    /// Results are restricted to resources owned by the given caller.
    OwnedBy(CallerIdentity),
}

/// Normalized, unordered collection of granted permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    /// Creates an empty permission set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from raw transport values, silently dropping
    /// identifiers outside the closed enumeration.
    pub fn from_transport_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = values
            .into_iter()
            .filter_map(|value| Permission::from_str(value.as_ref()).ok())
            .collect();

        Self(set)
    }

    /// Returns whether the set contains the given permission.
    #[must_use]
    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    /// Returns whether every required permission is granted.
    #[must_use]
    pub fn satisfies(&self, required: &[Permission]) -> bool {
        required.iter().all(|permission| self.contains(*permission))
    }

    /// Returns whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of granted permissions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over granted permissions in stable order.
    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0.iter().copied()
    }

    /// Resolves the caller's read tier, if any.
    ///
    /// Elevated wins when both read permissions are held: broader access
    /// takes precedence.
    #[must_use]
    pub fn read_tier(&self) -> Option<AccessTier> {
        if self.contains(Permission::GetAllEvents) {
            return Some(AccessTier::Elevated);
        }

        if self.contains(Permission::GetEvents) {
            return Some(AccessTier::Standard);
        }

        None
    }

    /// Resolves the data-visibility scope for the caller, if any read
    /// permission is held.
    #[must_use]
    pub fn read_scope(&self, caller: &CallerIdentity) -> Option<AccessScope> {
        match self.read_tier()? {
            AccessTier::Elevated => Some(AccessScope::AllOwners),
            AccessTier::Standard => Some(AccessScope::OwnedBy(caller.clone())),
        }
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
