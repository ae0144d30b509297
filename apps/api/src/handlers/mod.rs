use axum::extract::Extension;
use eventdesk_application::AuthorizedCaller;
use eventdesk_core::{AppError, AppResult};

pub mod events;
pub mod health;
pub mod profile;
pub mod session;

/// Resolves the gate's request annotation, failing closed when absent.
pub(crate) fn require_caller(
    caller: Option<Extension<AuthorizedCaller>>,
) -> AppResult<AuthorizedCaller> {
    caller
        .map(|Extension(caller)| caller)
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))
}
