use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use eventdesk_core::AppError;
use serde::Serialize;

/// API error payload.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    message: String,
}

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            // Claim decoding failures read as a plain unauthorized so the
            // response never hints at what the token was missing.
            AppError::Unauthorized(_) | AppError::ClaimDecoding(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::UpstreamAuthority(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self.0 {
            // Opaque denial: no permission names, no claim details.
            AppError::Unauthorized(_) | AppError::ClaimDecoding(_) => "unauthorized".to_owned(),
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use eventdesk_core::AppError;

    use super::ApiError;

    #[test]
    fn upstream_authority_failures_map_to_bad_gateway() {
        let response =
            ApiError(AppError::UpstreamAuthority("provider down".to_owned())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn claim_decoding_failures_read_as_unauthorized() {
        let response =
            ApiError(AppError::ClaimDecoding("bad payload".to_owned())).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
