// auth-server/src/socket/session.rs
use std::time::{Duration, Instant};

use actix::{Actor, ActorContext, Addr, AsyncContext, Handler, StreamHandler};
use actix_web_actors::ws;
use common::{ClientEvent, ConnectionIdentity, ServerEvent, ERROR_EVENT, WELCOME_EVENT};
use serde_json::json;

use super::hub::{Broadcast, EventHub, Join, Leave};

/// How often the server pings the client
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
/// Silence after which the connection is dropped
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Actor owning one admitted WebSocket connection.
///
/// It can only be built from a `ConnectionIdentity`, which the gate hands
/// out on admission, and it never replaces that identity.
pub struct ClientSessionActor {
    identity: ConnectionIdentity,
    hub: Addr<EventHub>,
    last_heartbeat: Instant,
}

impl ClientSessionActor {
    pub fn new(identity: ConnectionIdentity, hub: Addr<EventHub>) -> Self {
        Self {
            identity,
            hub,
            last_heartbeat: Instant::now(),
        }
    }

    // Heartbeat with timeout detection
    fn heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.last_heartbeat) > CLIENT_TIMEOUT {
                tracing::warn!(
                    "Heartbeat timeout for {} ({})",
                    act.identity.username(),
                    act.identity.connection_id()
                );
                ctx.stop();
                return;
            }

            ctx.ping(b"");
        });
    }

    fn send_event(&self, event: &ServerEvent, ctx: &mut ws::WebsocketContext<Self>) {
        match serde_json::to_string(event) {
            Ok(json) => ctx.text(json),
            Err(e) => tracing::error!("Failed to serialize event '{}': {}", event.event, e),
        }
    }

    fn handle_text(&mut self, text: &str, ctx: &mut ws::WebsocketContext<Self>) {
        match serde_json::from_str::<ClientEvent>(text) {
            Ok(event) => {
                tracing::debug!(
                    "Event '{}' from {} ({})",
                    event.event,
                    self.identity.username(),
                    self.identity.connection_id()
                );
                self.hub.do_send(Broadcast {
                    from: self.identity.username().to_string(),
                    event,
                });
            }
            Err(e) => {
                tracing::warn!(
                    "Malformed event from {}: {}",
                    self.identity.username(),
                    e
                );
                let reply = ServerEvent::system(ERROR_EVENT, json!("malformed event"));
                self.send_event(&reply, ctx);
            }
        }
    }
}

impl Actor for ClientSessionActor {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!(
            "User connected: {} ({})",
            self.identity.username(),
            self.identity.connection_id()
        );

        self.last_heartbeat = Instant::now();
        self.heartbeat(ctx);

        self.hub.do_send(Join {
            connection_id: self.identity.connection_id(),
            username: self.identity.username().to_string(),
            recipient: ctx.address().recipient(),
        });

        let welcome = ServerEvent::system(
            WELCOME_EVENT,
            json!({
                "connection_id": self.identity.connection_id(),
                "username": self.identity.username(),
            }),
        );
        self.send_event(&welcome, ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::info!(
            "User disconnected: {} ({})",
            self.identity.username(),
            self.identity.connection_id()
        );

        self.hub.do_send(Leave {
            connection_id: self.identity.connection_id(),
        });
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ClientSessionActor {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();
                self.handle_text(&text, ctx);
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                let reply = ServerEvent::system(ERROR_EVENT, json!("binary frames are not supported"));
                self.send_event(&reply, ctx);
            }
            Ok(ws::Message::Close(reason)) => {
                tracing::debug!("{} closing connection: {:?}", self.identity.username(), reason);
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => (),
            Err(e) => {
                tracing::error!("WebSocket protocol error for {}: {}", self.identity.username(), e);
                ctx.stop();
            }
        }
    }
}

impl Handler<ServerEvent> for ClientSessionActor {
    type Result = ();

    fn handle(&mut self, msg: ServerEvent, ctx: &mut Self::Context) -> Self::Result {
        self.send_event(&msg, ctx);
    }
}
