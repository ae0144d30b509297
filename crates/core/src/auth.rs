use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Stable subject identifier issued by the external identity provider.
///
/// Used as the ownership key for event resources and recorded on every
/// event at creation time. The value is opaque to this system (for Auth0
/// it looks like `auth0|64f1...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallerIdentity(String);

impl CallerIdentity {
    /// Creates a caller identity from a subject claim.
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self(subject.into())
    }

    /// Returns the subject claim as issued by the identity provider.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for CallerIdentity {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}
