use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::mpsc;
use tracing::debug;

use super::event::{ClientEvent, ServerEvent};
use super::registry::{ConnectionId, Registry};

pub type PeerSender = mpsc::UnboundedSender<ServerEvent>;

/// The relay itself: the membership registry plus one outbound channel per
/// live connection.
///
/// Every inbound event runs to completion under the lock, so a membership
/// read and the fan-out that follows it are atomic relative to other events.
/// Nothing awaits while the lock is held; delivery is a non-blocking send
/// into the peer's channel and the socket task drains it.
#[derive(Default)]
pub struct Hub {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    registry: Registry,
    peers: HashMap<ConnectionId, PeerSender>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly connected socket and mint its identity.
    pub fn attach(&self, tx: PeerSender) -> ConnectionId {
        let conn = ConnectionId::new();
        self.inner.lock().unwrap().peers.insert(conn, tx);
        conn
    }

    /// Disconnect: forget the peer and every room membership it held. After
    /// this no event is routed to `conn` again.
    pub fn detach(&self, conn: ConnectionId) {
        let mut inner = self.inner.lock().unwrap();
        inner.peers.remove(&conn);
        inner.registry.remove_connection(conn);
    }

    /// Dispatch one inbound event.
    ///
    /// Audience per event kind: `send_msg` and `markAsRead` go to every
    /// member of the room including the sender, `typing`/`stopTyping` to
    /// every member except the sender, `ping` back to the sender alone, and
    /// join/leave only touch the registry.
    pub fn handle(&self, from: ConnectionId, event: ClientEvent) {
        let mut inner = self.inner.lock().unwrap();
        match event {
            ClientEvent::JoinRoom(room) => {
                debug!(%from, %room, "join");
                inner.registry.join(from, &room);
            }
            ClientEvent::LeaveRoom(room) => {
                debug!(%from, %room, "leave");
                inner.registry.leave(from, &room);
            }
            ClientEvent::SendMsg(msg) => {
                let room = msg.room_id.clone();
                inner.emit_to_room(&room, ServerEvent::ReceiveMsg(msg), None);
            }
            ClientEvent::Typing(t) => {
                inner.emit_to_room(
                    &t.room_id,
                    ServerEvent::Typing { user_id: t.user_id },
                    Some(from),
                );
            }
            ClientEvent::StopTyping(t) => {
                inner.emit_to_room(
                    &t.room_id,
                    ServerEvent::StopTyping { user_id: t.user_id },
                    Some(from),
                );
            }
            ClientEvent::MarkAsRead(r) => {
                let room = r.conversation_id.clone();
                inner.emit_to_room(
                    &room,
                    ServerEvent::ConversationRead {
                        conversation_id: r.conversation_id,
                        user_id: r.user_id,
                    },
                    None,
                );
            }
            ClientEvent::Ping(_) => {
                inner.emit_to(
                    from,
                    ServerEvent::Pong {
                        message: "Hello from server".to_owned(),
                    },
                );
            }
        }
    }
}

impl Inner {
    fn emit_to_room(&self, room: &str, event: ServerEvent, exclude: Option<ConnectionId>) {
        for conn in self.registry.members_of(room) {
            if exclude == Some(conn) {
                continue;
            }
            self.emit_to(conn, event.clone());
        }
    }

    fn emit_to(&self, conn: ConnectionId, event: ServerEvent) {
        let Some(tx) = self.peers.get(&conn) else {
            return;
        };
        // One dead peer must never stall or fail delivery to the rest.
        if tx.send(event).is_err() {
            debug!(%conn, "skipping delivery to closed connection");
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Map;
    use tokio::sync::mpsc::{self, UnboundedReceiver, error::TryRecvError};

    use super::*;
    use crate::relay::event::{MessagePayload, PingPayload, ReadPayload, TypingPayload};

    fn connect(hub: &Hub) -> (ConnectionId, UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (hub.attach(tx), rx)
    }

    fn msg(room: &str, content: &str) -> MessagePayload {
        MessagePayload {
            room_id: room.to_owned(),
            id: "m1".to_owned(),
            is_read: true,
            user_id: "user-x".to_owned(),
            content: content.to_owned(),
            sender_email: "x@example.com".to_owned(),
            sent_by: "x@example.com".to_owned(),
            sent_at: "2026-08-30T12:00:00Z".to_owned(),
            extra: Map::new(),
        }
    }

    #[test]
    fn send_msg_reaches_every_member_including_sender() {
        let hub = Hub::new();
        let (a, mut rx_a) = connect(&hub);
        let (b, mut rx_b) = connect(&hub);
        let (c, mut rx_c) = connect(&hub);
        for conn in [a, b, c] {
            hub.handle(conn, ClientEvent::JoinRoom("conv-1".to_owned()));
        }

        hub.handle(a, ClientEvent::SendMsg(msg("conv-1", "hi")));

        for rx in [&mut rx_a, &mut rx_b, &mut rx_c] {
            let ServerEvent::ReceiveMsg(got) = rx.try_recv().unwrap() else {
                panic!("expected receive_msg");
            };
            assert_eq!(got.content, "hi");
        }
    }

    #[test]
    fn typing_excludes_sender() {
        let hub = Hub::new();
        let (a, mut rx_a) = connect(&hub);
        let (b, mut rx_b) = connect(&hub);
        hub.handle(a, ClientEvent::JoinRoom("conv-1".to_owned()));
        hub.handle(b, ClientEvent::JoinRoom("conv-1".to_owned()));

        hub.handle(
            a,
            ClientEvent::Typing(TypingPayload {
                room_id: "conv-1".to_owned(),
                user_id: "user-x".to_owned(),
            }),
        );

        assert_eq!(
            rx_b.try_recv().unwrap(),
            ServerEvent::Typing {
                user_id: "user-x".to_owned()
            }
        );
        assert_eq!(rx_a.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn mark_as_read_reaches_whole_room() {
        let hub = Hub::new();
        let (a, mut rx_a) = connect(&hub);
        let (b, mut rx_b) = connect(&hub);
        hub.handle(a, ClientEvent::JoinRoom("conv-1".to_owned()));
        hub.handle(b, ClientEvent::JoinRoom("conv-1".to_owned()));

        hub.handle(
            b,
            ClientEvent::MarkAsRead(ReadPayload {
                conversation_id: "conv-1".to_owned(),
                user_id: "user-y".to_owned(),
            }),
        );

        let expected = ServerEvent::ConversationRead {
            conversation_id: "conv-1".to_owned(),
            user_id: "user-y".to_owned(),
        };
        assert_eq!(rx_a.try_recv().unwrap(), expected);
        assert_eq!(rx_b.try_recv().unwrap(), expected);
    }

    #[test]
    fn one_closed_peer_does_not_block_the_rest() {
        let hub = Hub::new();
        let (a, mut rx_a) = connect(&hub);
        let (b, rx_b) = connect(&hub);
        let (c, mut rx_c) = connect(&hub);
        for conn in [a, b, c] {
            hub.handle(conn, ClientEvent::JoinRoom("conv-1".to_owned()));
        }
        drop(rx_b); // b's socket task is gone but it never detached

        hub.handle(a, ClientEvent::SendMsg(msg("conv-1", "still here")));

        assert!(matches!(rx_a.try_recv(), Ok(ServerEvent::ReceiveMsg(_))));
        assert!(matches!(rx_c.try_recv(), Ok(ServerEvent::ReceiveMsg(_))));
    }

    #[test]
    fn ping_answers_only_the_sender() {
        let hub = Hub::new();
        let (a, mut rx_a) = connect(&hub);
        let (b, mut rx_b) = connect(&hub);
        hub.handle(a, ClientEvent::JoinRoom("conv-1".to_owned()));
        hub.handle(b, ClientEvent::JoinRoom("conv-1".to_owned()));

        hub.handle(a, ClientEvent::Ping(PingPayload { message: None }));

        assert_eq!(
            rx_a.try_recv().unwrap(),
            ServerEvent::Pong {
                message: "Hello from server".to_owned()
            }
        );
        assert_eq!(rx_b.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn detach_stops_all_routing() {
        let hub = Hub::new();
        let (a, _rx_a) = connect(&hub);
        let (b, mut rx_b) = connect(&hub);
        hub.handle(a, ClientEvent::JoinRoom("conv-1".to_owned()));
        hub.handle(b, ClientEvent::JoinRoom("conv-1".to_owned()));

        hub.detach(b);
        hub.handle(a, ClientEvent::SendMsg(msg("conv-1", "anyone?")));

        // channel is disconnected, not holding a stale delivery
        assert_eq!(rx_b.try_recv(), Err(TryRecvError::Disconnected));
    }

    #[test]
    fn send_to_room_never_joined_goes_nowhere() {
        let hub = Hub::new();
        let (a, mut rx_a) = connect(&hub);

        hub.handle(a, ClientEvent::SendMsg(msg("conv-ghost", "echo?")));

        // sender is not a member, so not even the echo comes back
        assert_eq!(rx_a.try_recv(), Err(TryRecvError::Empty));
    }
}
