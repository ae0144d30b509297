use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use eventdesk_core::AppError;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::error::ApiResult;
use crate::state::AppState;

/// Session key carrying the staleness flag and its token fingerprint.
pub const SESSION_AUTH_KEY: &str = "eventdesk.auth";

/// Staleness bookkeeping persisted in the session.
///
/// The fingerprint ties the flag to the token it was computed for: a new
/// token (re-authentication) gets a fresh entry, which implicitly clears
/// a previously recorded staleness.
#[derive(Debug, Serialize, Deserialize)]
struct SessionAuthState {
    token_fingerprint: String,
    stale: bool,
}

/// Gate for the protected API surface.
///
/// Evaluates the bearer token against the identity provider's live
/// grants, persists drift in the session, and annotates the request with
/// the resulting [`eventdesk_application::AuthorizedCaller`]. Handlers
/// never see a request that skipped this evaluation unless the extension
/// is missing, which they must treat as zero permissions.
pub async fn authorize_request(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = bearer_token(request.headers())?;
    let caller = state.authorization_service.authorize_request(&token).await?;

    let previous = session
        .get::<SessionAuthState>(SESSION_AUTH_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session state: {error}")))?;

    let state_for_token =
        next_session_state(previous.as_ref(), token_fingerprint(&token), caller.stale());

    session
        .insert(SESSION_AUTH_KEY, &state_for_token)
        .await
        .map_err(|error| AppError::Internal(format!("failed to write session state: {error}")))?;

    request
        .extensions_mut()
        .insert(caller.with_staleness(state_for_token.stale));
    Ok(next.run(request).await)
}

/// Computes the session state after one gated request.
///
/// A recorded staleness carries forward only while the same token keeps
/// being presented; a different fingerprint means the caller
/// re-authenticated, which starts a fresh entry.
fn next_session_state(
    previous: Option<&SessionAuthState>,
    fingerprint: String,
    drift: bool,
) -> SessionAuthState {
    let carried = previous
        .is_some_and(|stored| stored.token_fingerprint == fingerprint && stored.stale);

    SessionAuthState {
        token_fingerprint: fingerprint,
        stale: drift || carried,
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))
}

fn token_fingerprint(token: &str) -> String {
    use sha2::{Digest, Sha256};
    use std::fmt::Write;

    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let result = hasher.finalize();

    result
        .iter()
        .fold(String::with_capacity(64), |mut acc, byte| {
            let _ = write!(acc, "{byte:02x}");
            acc
        })
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, header};

    use super::{SessionAuthState, bearer_token, next_session_state, token_fingerprint};

    #[test]
    fn bearer_token_requires_the_scheme_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("abc.def.ghi"));
        assert!(bearer_token(&headers).is_err());

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        let token = bearer_token(&headers);
        assert_eq!(token.ok().as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn missing_authorization_header_is_rejected() {
        assert!(bearer_token(&HeaderMap::new()).is_err());
    }

    #[test]
    fn recorded_staleness_carries_while_the_same_token_is_presented() {
        let previous = SessionAuthState {
            token_fingerprint: token_fingerprint("token-one"),
            stale: true,
        };

        let state = next_session_state(Some(&previous), token_fingerprint("token-one"), false);
        assert!(state.stale);
    }

    #[test]
    fn a_fresh_token_implicitly_clears_recorded_staleness() {
        let previous = SessionAuthState {
            token_fingerprint: token_fingerprint("token-one"),
            stale: true,
        };

        let state = next_session_state(Some(&previous), token_fingerprint("token-two"), false);
        assert!(!state.stale);
        assert_eq!(state.token_fingerprint, token_fingerprint("token-two"));
    }

    #[test]
    fn current_drift_marks_the_session_stale() {
        let state = next_session_state(None, token_fingerprint("token-one"), true);
        assert!(state.stale);

        let carried_forward =
            next_session_state(Some(&state), token_fingerprint("token-one"), false);
        assert!(carried_forward.stale);
    }

    #[test]
    fn fingerprint_distinguishes_tokens() {
        let first = token_fingerprint("token-one");
        let second = token_fingerprint("token-two");
        assert_eq!(first.len(), 64);
        assert_ne!(first, second);
        assert_eq!(first, token_fingerprint("token-one"));
    }
}
