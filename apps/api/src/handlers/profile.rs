use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use eventdesk_application::{AuthorizedCaller, ProfileChange};

use crate::dto::{UpdateProfileRequest, parse_optional_data_url};
use crate::error::ApiResult;
use crate::state::AppState;

/// Updates the caller's own account record at the identity provider.
pub async fn update_profile_handler(
    State(state): State<AppState>,
    caller: Option<Extension<AuthorizedCaller>>,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<StatusCode> {
    let caller = super::require_caller(caller)?;

    let change = ProfileChange {
        metadata: payload.user_metadata,
        picture: parse_optional_data_url(payload.picture.as_deref())?,
    };
    state.profile_service.update_profile(&caller, change).await?;

    Ok(StatusCode::NO_CONTENT)
}
