// auth-server/src/api/mod.rs
pub mod auth;

use actix_web::{error, web, HttpResponse};
use serde_json::json;

/// Reject unreadable JSON bodies with a JSON error instead of plain text
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(json!({ "error": message })),
        )
        .into()
    })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).service(auth::issue_token);
}
