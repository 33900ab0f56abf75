// auth-server/src/api/auth.rs
use actix_web::{post, web, HttpResponse, Responder};
use common::{IdentityClaim, TokenIssuer};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub username: String,
}

// Issue a signed token for the claimed username.
// The username is taken at face value; a credential check belongs in front of this.
#[post("/auth")]
pub async fn issue_token(
    body: web::Json<AuthRequest>,
    issuer: web::Data<TokenIssuer>,
) -> impl Responder {
    let username = body.into_inner().username;
    if username.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "username is required"
        }));
    }

    match issuer.issue(IdentityClaim::new(username)) {
        Ok(issued) => {
            tracing::info!("Issued token for {} (expires {})", issued.claim.username, issued.expires_at);
            HttpResponse::Ok().json(AuthResponse {
                token: issued.token,
                username: issued.claim.username,
            })
        }
        Err(e) => {
            tracing::error!("Error issuing token: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "error": "Internal server error"
            }))
        }
    }
}
