// auth-server/src/gate.rs
use actix_web::{http::header, web, HttpRequest};
use common::{expiry_instant, AuthError, ConnectionIdentity, TokenIssuer};
use serde::Deserialize;

/// Query parameter carrying the token during the WebSocket handshake
pub const TOKEN_QUERY_PARAM: &str = "token";

#[derive(Debug, Deserialize)]
struct HandshakeParams {
    token: Option<String>,
}

/// Pull the token out of the upgrade request.
///
/// Looks at the `token` query parameter first, then at an
/// `Authorization: Bearer` header. Empty values count as absent.
pub fn handshake_token(req: &HttpRequest) -> Option<String> {
    let from_query = web::Query::<HandshakeParams>::from_query(req.query_string())
        .ok()
        .and_then(|params| params.into_inner().token);

    from_query
        .or_else(|| {
            req.headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(|token| token.trim().to_string())
        })
        .filter(|token| !token.is_empty())
}

/// Admission check run once per connection attempt, before any session
/// actor exists.
#[derive(Clone, Debug)]
pub struct ConnectionGate {
    issuer: TokenIssuer,
}

impl ConnectionGate {
    pub fn new(issuer: TokenIssuer) -> Self {
        Self { issuer }
    }

    /// Admit or reject an attempt. There is no retry: a rejected client has
    /// to open a new connection.
    pub fn admit(&self, token: Option<&str>) -> Result<ConnectionIdentity, AuthError> {
        let token = token
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let claims = self.issuer.decode(token)?;
        Ok(ConnectionIdentity::admit(claims.identity, expiry_instant(claims.exp)))
    }
}
