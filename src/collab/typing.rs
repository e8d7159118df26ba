use std::sync::Arc;
use uuid::Uuid;

use crate::collab::registry::RoomRegistry;
use crate::models::{ServerMessage, UserTypingPayload};

/// Stateless fan-out of typing start/stop signals.
///
/// Nothing is persisted or remembered: a disconnecting client that never
/// sent typing_stop leaves observers with a stale "is typing" indicator.
/// That matches the historical behavior and is deliberately not patched
/// here.
pub struct TypingRelay {
    registry: Arc<RoomRegistry>,
}

impl TypingRelay {
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self { registry }
    }

    pub fn typing_start(&self, connection_id: Uuid, note_id: Uuid, user_name: &str) {
        self.relay(connection_id, note_id, user_name, true);
    }

    pub fn typing_stop(&self, connection_id: Uuid, note_id: Uuid, user_name: &str) {
        self.relay(connection_id, note_id, user_name, false);
    }

    fn relay(&self, connection_id: Uuid, note_id: Uuid, user_name: &str, is_typing: bool) {
        self.registry.broadcast(
            note_id,
            ServerMessage::UserTyping(UserTypingPayload {
                user_name: user_name.to_string(),
                is_typing,
            }),
            Some(connection_id),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    fn connect(registry: &RoomRegistry) -> (Uuid, UnboundedReceiver<ServerMessage>) {
        let id = Uuid::new_v4();
        let (tx, rx) = unbounded_channel();
        registry.register(id, tx);
        (id, rx)
    }

    #[test]
    fn typing_signals_reach_everyone_but_the_sender() {
        let registry = Arc::new(RoomRegistry::new());
        let relay = TypingRelay::new(registry.clone());
        let note_id = Uuid::new_v4();
        let (alice, mut alice_rx) = connect(&registry);
        let (bob, mut bob_rx) = connect(&registry);
        registry.join(alice, note_id, "Alice");
        registry.join(bob, note_id, "Bob");

        relay.typing_start(alice, note_id, "Alice");
        relay.typing_stop(alice, note_id, "Alice");

        assert!(alice_rx.try_recv().is_err());
        match bob_rx.try_recv().unwrap() {
            ServerMessage::UserTyping(payload) => {
                assert_eq!(payload.user_name, "Alice");
                assert!(payload.is_typing);
            }
            other => panic!("expected user_typing, got {other:?}"),
        }
        match bob_rx.try_recv().unwrap() {
            ServerMessage::UserTyping(payload) => assert!(!payload.is_typing),
            other => panic!("expected user_typing, got {other:?}"),
        }
    }

    #[test]
    fn typing_in_an_empty_room_is_a_noop() {
        let registry = Arc::new(RoomRegistry::new());
        let relay = TypingRelay::new(registry.clone());
        let (alice, mut alice_rx) = connect(&registry);

        relay.typing_start(alice, Uuid::new_v4(), "Alice");

        assert!(alice_rx.try_recv().is_err());
    }
}
