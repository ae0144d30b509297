use std::sync::Arc;

use eventdesk_core::{AppError, AppResult, CallerIdentity};

use crate::authorization_service::AuthorizedCaller;
use crate::event_ports::{ImageStore, ImageUpload};
use crate::identity_ports::{IdentityProvider, ProfileUpdate};

/// Logical object-store directory for account profile pictures.
const PROFILE_IMAGE_DIRECTORY: &str = "user-details";

/// Input for an account profile update.
#[derive(Debug, Clone, Default)]
pub struct ProfileChange {
    /// Replacement user metadata, if changing.
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    /// New profile picture, if changing.
    pub picture: Option<ImageUpload>,
}

/// Application service for account profile updates.
///
/// Callers can only ever change their own record: the target subject is
/// taken from the gate's annotation, never from the request payload. No
/// event permission is required beyond passing the gate.
#[derive(Clone)]
pub struct ProfileService {
    identity_provider: Arc<dyn IdentityProvider>,
    image_store: Arc<dyn ImageStore>,
}

impl ProfileService {
    /// Creates a profile service from its ports.
    #[must_use]
    pub fn new(
        identity_provider: Arc<dyn IdentityProvider>,
        image_store: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            identity_provider,
            image_store,
        }
    }

    /// Updates the caller's account record at the identity provider.
    ///
    /// A new picture is stored first and its public URL pushed alongside
    /// the metadata. An update carrying neither is rejected before any
    /// provider call.
    pub async fn update_profile(
        &self,
        caller: &AuthorizedCaller,
        change: ProfileChange,
    ) -> AppResult<()> {
        if change.metadata.is_none() && change.picture.is_none() {
            return Err(AppError::Validation(
                "profile update carries no changes".to_owned(),
            ));
        }

        let picture_url = match change.picture {
            Some(image) => Some(
                self.image_store
                    .store_image(
                        &picture_name(caller.identity()),
                        PROFILE_IMAGE_DIRECTORY,
                        &image,
                    )
                    .await?,
            ),
            None => None,
        };

        let update = ProfileUpdate {
            metadata: change.metadata,
            picture_url,
        };

        self.identity_provider
            .update_user_profile(caller.identity().subject(), &update)
            .await
    }
}

fn picture_name(identity: &CallerIdentity) -> String {
    let sanitized: String = identity
        .subject()
        .chars()
        .map(|character| {
            if character.is_ascii_alphanumeric() {
                character
            } else {
                '-'
            }
        })
        .collect();

    format!("picture-{sanitized}")
}
