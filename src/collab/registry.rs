use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Presence, ServerMessage};

/// A room: the connections currently collaborating on one note id.
/// Members are kept in join order so presence snapshots are deterministic.
struct Room {
    members: Vec<Presence>,
}

struct ConnectionEntry {
    tx: UnboundedSender<ServerMessage>,
    room: Option<Uuid>,
}

#[derive(Default)]
struct RegistryInner {
    rooms: HashMap<Uuid, Room>,
    connections: HashMap<Uuid, ConnectionEntry>,
}

/// Tracks live connections and their room membership.
///
/// Rooms are created lazily on first join and pruned the moment their
/// presence set empties. All mutations go through one mutex with short,
/// await-free critical sections, so leave-then-join is a single atomic
/// transition and concurrent join/leave on the same room cannot lose
/// updates. Store I/O never happens under this lock.
#[derive(Default)]
pub struct RoomRegistry {
    inner: Mutex<RegistryInner>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection's outbound channel. Called once per socket,
    /// before any join.
    pub fn register(&self, connection_id: Uuid, tx: UnboundedSender<ServerMessage>) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .connections
            .insert(connection_id, ConnectionEntry { tx, room: None });
        debug!("Connection registered: {}", connection_id);
    }

    /// Move a connection into a room, leaving any previous room first.
    ///
    /// The switch is atomic: at no instant is the connection a member of
    /// two rooms or of none mid-transition. Remaining members of the old
    /// room get a presence broadcast; the caller broadcasts to the new
    /// room once the note load has been dealt with.
    pub fn join(&self, connection_id: Uuid, note_id: Uuid, user_name: &str) {
        let mut inner = self.inner.lock().unwrap();
        let Some(entry) = inner.connections.get_mut(&connection_id) else {
            return;
        };
        let previous = entry.room.replace(note_id);
        if let Some(prev_id) = previous {
            Self::remove_member(&mut inner, prev_id, connection_id);
            // Re-joining the same room just refreshes the presence entry.
            if prev_id != note_id {
                Self::broadcast_presence_locked(&inner, prev_id);
            }
        }

        let presence = Presence {
            connection_id,
            user_name: user_name.to_string(),
            joined_at: Utc::now(),
        };
        inner
            .rooms
            .entry(note_id)
            .or_insert_with(|| Room { members: Vec::new() })
            .members
            .push(presence);
        debug!("User {} joined note {}", user_name, note_id);
    }

    /// Remove a connection from its room, prune the room if empty, and
    /// broadcast the updated presence list to whoever remains. No-op if
    /// the connection was not in any room.
    pub fn leave(&self, connection_id: Uuid) {
        let mut inner = self.inner.lock().unwrap();
        let Some(entry) = inner.connections.get_mut(&connection_id) else {
            return;
        };
        let Some(note_id) = entry.room.take() else {
            return;
        };
        Self::remove_member(&mut inner, note_id, connection_id);
        Self::broadcast_presence_locked(&inner, note_id);
        debug!("Connection {} left note {}", connection_id, note_id);
    }

    /// Drop a connection entirely. Called on disconnect.
    pub fn unregister(&self, connection_id: Uuid) {
        self.leave(connection_id);
        let mut inner = self.inner.lock().unwrap();
        inner.connections.remove(&connection_id);
        debug!("Connection unregistered: {}", connection_id);
    }

    /// Current presence entries for a room, in join order. Empty if the
    /// room does not exist.
    pub fn presence_snapshot(&self, note_id: Uuid) -> Vec<Presence> {
        let inner = self.inner.lock().unwrap();
        inner
            .rooms
            .get(&note_id)
            .map(|room| room.members.clone())
            .unwrap_or_default()
    }

    /// Whether the connection is currently joined to the given room.
    pub fn is_member(&self, connection_id: Uuid, note_id: Uuid) -> bool {
        let inner = self.inner.lock().unwrap();
        inner
            .connections
            .get(&connection_id)
            .map(|entry| entry.room == Some(note_id))
            .unwrap_or(false)
    }

    /// Whether a room currently exists (i.e. has at least one member).
    pub fn has_room(&self, note_id: Uuid) -> bool {
        self.inner.lock().unwrap().rooms.contains_key(&note_id)
    }

    /// Send the current presence list to every member of the room.
    pub fn broadcast_presence(&self, note_id: Uuid) {
        let inner = self.inner.lock().unwrap();
        Self::broadcast_presence_locked(&inner, note_id);
    }

    /// Send a message to every member of a room, optionally skipping one
    /// connection (the sender never receives its own echo).
    pub fn broadcast(&self, note_id: Uuid, message: ServerMessage, skip: Option<Uuid>) {
        let inner = self.inner.lock().unwrap();
        Self::broadcast_locked(&inner, note_id, message, skip);
    }

    /// Point-to-point delivery. A send to a connection that is already
    /// gone is dropped silently.
    pub fn send_to(&self, connection_id: Uuid, message: ServerMessage) {
        let inner = self.inner.lock().unwrap();
        if let Some(entry) = inner.connections.get(&connection_id) {
            let _ = entry.tx.send(message);
        }
    }

    fn remove_member(inner: &mut RegistryInner, note_id: Uuid, connection_id: Uuid) {
        if let Some(room) = inner.rooms.get_mut(&note_id) {
            room.members.retain(|p| p.connection_id != connection_id);
            if room.members.is_empty() {
                inner.rooms.remove(&note_id);
            }
        }
    }

    fn broadcast_presence_locked(inner: &RegistryInner, note_id: Uuid) {
        let Some(room) = inner.rooms.get(&note_id) else {
            return;
        };
        let users = room.members.clone();
        Self::broadcast_locked(inner, note_id, ServerMessage::ActiveUsers { users }, None);
    }

    fn broadcast_locked(
        inner: &RegistryInner,
        note_id: Uuid,
        message: ServerMessage,
        skip: Option<Uuid>,
    ) {
        let Some(room) = inner.rooms.get(&note_id) else {
            return;
        };
        for member in &room.members {
            if skip == Some(member.connection_id) {
                continue;
            }
            if let Some(entry) = inner.connections.get(&member.connection_id) {
                // A closed channel means the peer is mid-disconnect.
                let _ = entry.tx.send(message.clone());
            }
        }
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

    fn drain(rx: &mut UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    fn names(snapshot: &[Presence]) -> Vec<&str> {
        snapshot.iter().map(|p| p.user_name.as_str()).collect()
    }

    #[test]
    fn join_switches_rooms_atomically() {
        let registry = RoomRegistry::new();
        let (conn, _rx) = connect(&registry);
        let room1 = Uuid::new_v4();
        let room2 = Uuid::new_v4();

        registry.join(conn, room1, "Alice");
        registry.join(conn, room2, "Alice");

        assert!(registry.presence_snapshot(room1).is_empty());
        assert_eq!(names(&registry.presence_snapshot(room2)), vec!["Alice"]);
        assert!(registry.is_member(conn, room2));
        assert!(!registry.is_member(conn, room1));
    }

    #[test]
    fn joins_and_leaves_track_membership_count() {
        let registry = RoomRegistry::new();
        let room = Uuid::new_v4();
        let conns: Vec<_> = (0..5)
            .map(|i| {
                let (conn, rx) = connect(&registry);
                registry.join(conn, room, &format!("user-{i}"));
                (conn, rx)
            })
            .collect();

        registry.leave(conns[0].0);
        registry.leave(conns[3].0);

        let snapshot = registry.presence_snapshot(room);
        assert_eq!(names(&snapshot), vec!["user-1", "user-2", "user-4"]);
    }

    #[test]
    fn empty_room_is_pruned_and_recreated_fresh() {
        let registry = RoomRegistry::new();
        let room = Uuid::new_v4();
        let (conn, _rx) = connect(&registry);

        registry.join(conn, room, "Alice");
        assert!(registry.has_room(room));

        registry.leave(conn);
        assert!(!registry.has_room(room));
        assert!(registry.presence_snapshot(room).is_empty());

        let (other, _rx2) = connect(&registry);
        registry.join(other, room, "Bob");
        assert_eq!(names(&registry.presence_snapshot(room)), vec!["Bob"]);
    }

    #[test]
    fn leave_broadcasts_presence_to_remaining_members() {
        let registry = RoomRegistry::new();
        let room = Uuid::new_v4();
        let (alice, mut alice_rx) = connect(&registry);
        let (bob, mut bob_rx) = connect(&registry);
        registry.join(alice, room, "Alice");
        registry.join(bob, room, "Bob");
        drain(&mut alice_rx);
        drain(&mut bob_rx);

        registry.leave(alice);

        let received = drain(&mut bob_rx);
        assert_eq!(received.len(), 1);
        match &received[0] {
            ServerMessage::ActiveUsers { users } => assert_eq!(names(users), vec!["Bob"]),
            other => panic!("expected active_users, got {other:?}"),
        }
        // The leaver hears nothing.
        assert!(drain(&mut alice_rx).is_empty());
    }

    #[test]
    fn room_switch_notifies_the_abandoned_room() {
        let registry = RoomRegistry::new();
        let room1 = Uuid::new_v4();
        let room2 = Uuid::new_v4();
        let (alice, _alice_rx) = connect(&registry);
        let (bob, mut bob_rx) = connect(&registry);
        registry.join(bob, room1, "Bob");
        registry.join(alice, room1, "Alice");
        registry.broadcast_presence(room1);
        drain(&mut bob_rx);

        registry.join(alice, room2, "Alice");

        let received = drain(&mut bob_rx);
        assert_eq!(received.len(), 1);
        match &received[0] {
            ServerMessage::ActiveUsers { users } => assert_eq!(names(users), vec!["Bob"]),
            other => panic!("expected active_users, got {other:?}"),
        }
    }

    #[test]
    fn broadcast_skips_the_sender() {
        let registry = RoomRegistry::new();
        let room = Uuid::new_v4();
        let (alice, mut alice_rx) = connect(&registry);
        let (bob, mut bob_rx) = connect(&registry);
        registry.join(alice, room, "Alice");
        registry.join(bob, room, "Bob");
        drain(&mut alice_rx);
        drain(&mut bob_rx);

        registry.broadcast(
            room,
            ServerMessage::Error {
                message: "ping".to_string(),
            },
            Some(alice),
        );

        assert!(drain(&mut alice_rx).is_empty());
        assert_eq!(drain(&mut bob_rx).len(), 1);
    }

    #[test]
    fn leave_without_membership_is_a_noop() {
        let registry = RoomRegistry::new();
        let (conn, _rx) = connect(&registry);
        registry.leave(conn);
        registry.unregister(conn);
        assert!(!registry.is_member(conn, Uuid::new_v4()));
    }
}
