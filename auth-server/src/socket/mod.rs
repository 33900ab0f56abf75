// auth-server/src/socket/mod.rs
pub mod hub;
pub mod session;

use actix::Addr;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;

use crate::gate::{handshake_token, ConnectionGate};
use hub::EventHub;
use session::ClientSessionActor;

/// Configure the WebSocket route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ws").route(web::get().to(ws_route)));
}

/// WebSocket upgrade, gated on a valid token.
///
/// A rejected attempt gets a plain 401 and no session actor is created.
async fn ws_route(
    req: HttpRequest,
    stream: web::Payload,
    gate: web::Data<ConnectionGate>,
    hub: web::Data<Addr<EventHub>>,
) -> Result<HttpResponse, Error> {
    let token = handshake_token(&req);

    let identity = match gate.admit(token.as_deref()) {
        Ok(identity) => identity,
        Err(e) => {
            let peer = req.connection_info().realip_remote_addr().unwrap_or("unknown").to_string();
            tracing::warn!("Rejected connection attempt from {}: {}", peer, e);
            return Err(e.into());
        }
    };

    tracing::info!(
        "Admitted connection {} for {}",
        identity.connection_id(),
        identity.username()
    );

    let session = ClientSessionActor::new(identity, hub.get_ref().clone());
    ws::start(session, &req, stream)
}
