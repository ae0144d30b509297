use axum::Json;
use axum::extract::Extension;
use eventdesk_application::AuthorizedCaller;

use crate::dto::SessionStatusResponse;
use crate::error::ApiResult;

/// Reports whether the caller's token has drifted from the live grants.
///
/// Staleness never fails the request itself; the portal polls this after
/// gated calls and prompts a re-login when required.
pub async fn session_status_handler(
    caller: Option<Extension<AuthorizedCaller>>,
) -> ApiResult<Json<SessionStatusResponse>> {
    let caller = super::require_caller(caller)?;

    Ok(Json(SessionStatusResponse {
        authenticated: true,
        re_authentication_required: caller.stale(),
    }))
}
