// common/src/error.rs
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use jsonwebtoken::errors::ErrorKind;
use serde_json::json;

/// Body sent to a client for any failed connection attempt
pub const AUTH_ERROR_MESSAGE: &str = "Authentication error";

/// Failures while signing or verifying a token
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    /// Bad signature, tampered payload, malformed token or past expiry
    #[error("token rejected: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

impl TokenError {
    pub fn is_expired(&self) -> bool {
        match self {
            TokenError::Invalid(e) => matches!(e.kind(), ErrorKind::ExpiredSignature),
            TokenError::Signing(_) => false,
        }
    }
}

/// Outcome of a rejected connection attempt.
///
/// Both variants render the same 401 response; only server logs can tell
/// them apart.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no token presented")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(#[from] TokenError),
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Unauthorized().json(json!({
            "error": AUTH_ERROR_MESSAGE
        }))
    }
}

/// Fatal errors that stop the process before it serves anything
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("signing secret is not configured (set JWT_SECRET or auth.jwt_secret)")]
    MissingSecret,

    #[error("failed to load configuration: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("failed to install tracing subscriber: {0}")]
    Tracing(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    fn invalid() -> AuthError {
        AuthError::InvalidToken(TokenError::Invalid(ErrorKind::InvalidSignature.into()))
    }

    #[actix_web::test]
    async fn test_missing_and_invalid_render_identically() {
        let missing = AuthError::MissingToken.error_response();
        let invalid = invalid().error_response();

        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(missing.status(), invalid.status());

        let missing_body = to_bytes(missing.into_body()).await.unwrap();
        let invalid_body = to_bytes(invalid.into_body()).await.unwrap();
        assert_eq!(missing_body, invalid_body);
    }

    #[test]
    fn test_is_expired() {
        let expired = TokenError::Invalid(ErrorKind::ExpiredSignature.into());
        assert!(expired.is_expired());

        let forged = TokenError::Invalid(ErrorKind::InvalidSignature.into());
        assert!(!forged.is_expired());
    }
}
