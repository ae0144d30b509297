use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use eventdesk_core::{AppError, AppResult};
use serde::Deserialize;

/// Claim set extracted from a bearer token payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    /// Stable subject identifier of the caller.
    pub sub: String,
    /// Permission identifiers embedded at token issuance.
    pub permissions: Vec<String>,
}

/// Decodes the payload segment of a bearer token into a claim set.
///
/// This only decodes; it does not verify the token signature or expiry.
/// Signature verification happens at the ingress in front of this service,
/// so a standalone deployment must add it before trusting any claim.
///
/// An empty `permissions` array is valid and yields zero permissions. A
/// token that cannot be parsed, or whose payload lacks `sub` or
/// `permissions`, fails with [`AppError::ClaimDecoding`]; callers treat
/// that the same as holding no permissions at all.
pub fn decode_claims(token: &str) -> AppResult<TokenClaims> {
    let mut segments = token.split('.');
    let payload_segment = segments
        .nth(1)
        .ok_or_else(|| AppError::ClaimDecoding("token has no payload segment".to_owned()))?;

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload_segment)
        .map_err(|error| AppError::ClaimDecoding(format!("payload is not base64url: {error}")))?;

    serde_json::from_slice::<TokenClaims>(&payload_bytes)
        .map_err(|error| AppError::ClaimDecoding(format!("payload claims are invalid: {error}")))
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    use super::decode_claims;

    fn token_with_payload(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.signature")
    }

    #[test]
    fn decodes_subject_and_permissions() {
        let token = token_with_payload(&serde_json::json!({
            "sub": "auth0|company-1",
            "permissions": ["create:events", "get:events"],
            "iss": "https://tenant.example.auth0.com/",
        }));

        let claims = decode_claims(&token);
        assert!(claims.is_ok());
        let claims = match claims {
            Ok(claims) => claims,
            Err(error) => panic!("claims should decode: {error}"),
        };
        assert_eq!(claims.sub, "auth0|company-1");
        assert_eq!(claims.permissions.len(), 2);
    }

    #[test]
    fn empty_permissions_array_is_valid() {
        let token = token_with_payload(&serde_json::json!({
            "sub": "auth0|company-1",
            "permissions": [],
        }));

        let claims = decode_claims(&token);
        assert!(claims.map(|claims| claims.permissions.is_empty()).unwrap_or(false));
    }

    #[test]
    fn missing_permissions_field_fails_decoding() {
        let token = token_with_payload(&serde_json::json!({
            "sub": "auth0|company-1",
        }));

        let claims = decode_claims(&token);
        assert!(claims.is_err());
    }

    #[test]
    fn malformed_token_fails_decoding() {
        assert!(decode_claims("not a token").is_err());
        assert!(decode_claims("a.!!!not-base64!!!.c").is_err());
        assert!(decode_claims("").is_err());
    }
}
