// common/src/models/identity.rs
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::token::IdentityClaim;

/// Identity attached to an admitted connection.
///
/// Set once when the connection passes the gate and read-only afterwards;
/// there are no setters.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionIdentity {
    connection_id: Uuid,
    claim: IdentityClaim,
    expires_at: Option<DateTime<Utc>>,
}

impl ConnectionIdentity {
    /// Attach `claim` to a new connection id
    pub fn admit(claim: IdentityClaim, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            connection_id: Uuid::new_v4(),
            claim,
            expires_at,
        }
    }

    pub fn connection_id(&self) -> Uuid {
        self.connection_id
    }

    pub fn username(&self) -> &str {
        &self.claim.username
    }

    pub fn claim(&self) -> &IdentityClaim {
        &self.claim
    }

    /// When the token that admitted this connection stops being valid
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}
