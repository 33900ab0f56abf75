// common/src/token.rs
use std::fmt;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{StartupError, TokenError};

/// Lifetime of every issued token
pub const TOKEN_TTL_DAYS: i64 = 30;

/// Identity data carried inside a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaim {
    pub username: String,
}

impl IdentityClaim {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

/// JWT payload: the identity plus its validity window
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(flatten)]
    pub identity: IdentityClaim,
    pub iat: u64, // issued at
    pub exp: u64, // expiration time
}

/// A freshly signed token together with the claim it encodes
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claim: IdentityClaim,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies identity tokens with the process-wide HS256 secret.
///
/// Built once at startup and shared read-only; it holds no record of the
/// tokens it has issued.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Result<Self, StartupError> {
        if secret.trim().is_empty() {
            return Err(StartupError::MissingSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; a token one second past `exp` is rejected
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Sign `claim` with a 30 day expiry starting now
    pub fn issue(&self, claim: IdentityClaim) -> Result<IssuedToken, TokenError> {
        self.issue_at(claim, Utc::now())
    }

    /// Sign `claim` as if issued at `issued_at`
    pub fn issue_at(
        &self,
        claim: IdentityClaim,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = issued_at + Duration::days(TOKEN_TTL_DAYS);

        let claims = TokenClaims {
            identity: claim,
            iat: unix_seconds(issued_at),
            exp: unix_seconds(expires_at),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)?;

        Ok(IssuedToken {
            token,
            claim: claims.identity,
            expires_at,
        })
    }

    /// Check signature and expiry, returning the embedded identity
    pub fn verify(&self, token: &str) -> Result<IdentityClaim, TokenError> {
        self.decode(token).map(|claims| claims.identity)
    }

    /// Like `verify`, but keeps the validity window
    pub fn decode(&self, token: &str) -> Result<TokenClaims, TokenError> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}

fn unix_seconds(instant: DateTime<Utc>) -> u64 {
    u64::try_from(instant.timestamp()).unwrap_or_default()
}

/// Convert a token's `exp` back into a timestamp
pub fn expiry_instant(exp: u64) -> Option<DateTime<Utc>> {
    let secs = i64::try_from(exp).ok()?;
    Utc.timestamp_opt(secs, 0).single()
}
