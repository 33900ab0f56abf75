// auth-server/src/socket/hub.rs
use actix::{Actor, Context, Handler, Message, MessageResult, Recipient};
use common::{ClientEvent, ServerEvent};
use dashmap::DashMap;
use uuid::Uuid;

/// Message for registering an admitted connection
#[derive(Message)]
#[rtype(result = "()")]
pub struct Join {
    pub connection_id: Uuid,
    pub username: String,
    pub recipient: Recipient<ServerEvent>,
}

/// Message for removing a connection
#[derive(Message)]
#[rtype(result = "()")]
pub struct Leave {
    pub connection_id: Uuid,
}

/// Relay a client event to every admitted connection
#[derive(Message)]
#[rtype(result = "()")]
pub struct Broadcast {
    pub from: String,
    pub event: ClientEvent,
}

/// Number of admitted connections currently registered
#[derive(Message)]
#[rtype(result = "usize")]
pub struct ConnectionCount;

struct Member {
    username: String,
    recipient: Recipient<ServerEvent>,
}

/// Event stream shared by all admitted connections.
///
/// Only sessions that passed the gate ever join.
#[derive(Default)]
pub struct EventHub {
    members: DashMap<Uuid, Member>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn broadcast(&self, event: ServerEvent) {
        for member in self.members.iter() {
            member.value().recipient.do_send(event.clone());
        }
    }
}

impl Actor for EventHub {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("Event hub started");
    }
}

impl Handler<Join> for EventHub {
    type Result = ();

    fn handle(&mut self, msg: Join, _ctx: &mut Self::Context) -> Self::Result {
        tracing::debug!("{} joined the event stream ({})", msg.username, msg.connection_id);
        self.members.insert(
            msg.connection_id,
            Member {
                username: msg.username,
                recipient: msg.recipient,
            },
        );
        tracing::info!("{} connection(s) active", self.members.len());
    }
}

impl Handler<Leave> for EventHub {
    type Result = ();

    fn handle(&mut self, msg: Leave, _ctx: &mut Self::Context) -> Self::Result {
        if let Some((_, member)) = self.members.remove(&msg.connection_id) {
            tracing::debug!("{} left the event stream ({})", member.username, msg.connection_id);
        }
        tracing::info!("{} connection(s) active", self.members.len());
    }
}

impl Handler<Broadcast> for EventHub {
    type Result = ();

    fn handle(&mut self, msg: Broadcast, _ctx: &mut Self::Context) -> Self::Result {
        tracing::debug!("Broadcasting '{}' from {}", msg.event.event, msg.from);
        self.broadcast(ServerEvent::relay(&msg.from, msg.event));
    }
}

impl Handler<ConnectionCount> for EventHub {
    type Result = MessageResult<ConnectionCount>;

    fn handle(&mut self, _msg: ConnectionCount, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.members.len())
    }
}
