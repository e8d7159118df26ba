use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

use crate::collab::registry::RoomRegistry;
use crate::models::{CollabError, NoteFields, NoteUpdatedPayload, ServerMessage};
use crate::store::NoteStore;

/// Validates, persists and fans out note edits.
///
/// Consistency is last-write-wins at the field level: no merge, no
/// version check, no rejection of stale writes. Concurrent edits to the
/// same field overwrite in arrival order at the store.
pub struct UpdateCoordinator {
    registry: Arc<RoomRegistry>,
    store: Arc<dyn NoteStore>,
    // Per-note gates. The tokio mutex queues waiters FIFO, so accepted
    // updates reach the store in acceptance order for a given note while
    // unrelated notes proceed concurrently. Entries are released once the
    // last in-flight update for a note finishes.
    gates: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl UpdateCoordinator {
    pub fn new(registry: Arc<RoomRegistry>, store: Arc<dyn NoteStore>) -> Self {
        Self {
            registry,
            store,
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Apply a sparse edit to a note and broadcast it to the rest of the
    /// sender's room.
    ///
    /// Fails with `Unauthorized` unless the connection is currently
    /// joined to the note's room, and with `NotFound` if the store has
    /// no such note. Failures are reported to the caller only; nothing
    /// is written or broadcast. The sender never receives an echo of its
    /// own update.
    pub async fn update(
        &self,
        connection_id: Uuid,
        note_id: Uuid,
        fields: NoteFields,
        user_name: &str,
    ) -> Result<(), CollabError> {
        if !self.registry.is_member(connection_id, note_id) {
            return Err(CollabError::Unauthorized);
        }

        let gate = self.gate(note_id);
        let result = {
            let _ordered = gate.lock().await;
            self.persist_and_broadcast(connection_id, note_id, fields, user_name)
                .await
        };
        self.release_gate(note_id, &gate);
        result
    }

    async fn persist_and_broadcast(
        &self,
        connection_id: Uuid,
        note_id: Uuid,
        fields: NoteFields,
        user_name: &str,
    ) -> Result<(), CollabError> {
        let note = self
            .store
            .apply_update(note_id, &fields, user_name)
            .await?
            .ok_or(CollabError::NotFound)?;

        debug!("Note {} updated by {}", note_id, user_name);

        // Broadcast only the fields the editor supplied, plus the stamps.
        // Whoever remains in the room at this point receives it; the
        // sender may already be gone, which is fine.
        let payload = NoteUpdatedPayload {
            title: fields.title,
            content: fields.content,
            updated_at: note.updated_at,
            last_edited_by: note.last_edited_by,
            updated_by: user_name.to_string(),
        };
        self.registry.broadcast(
            note_id,
            ServerMessage::NoteUpdated(payload),
            Some(connection_id),
        );
        Ok(())
    }

    fn gate(&self, note_id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
        let mut gates = self.gates.lock().unwrap();
        gates
            .entry(note_id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Drop the gate entry once no other update holds it. Gate clones are
    /// only ever handed out under the `gates` lock, so a strong count of
    /// two here means exactly the map and this caller: nobody is queued.
    fn release_gate(&self, note_id: Uuid, gate: &Arc<tokio::sync::Mutex<()>>) {
        let mut gates = self.gates.lock().unwrap();
        if Arc::strong_count(gate) == 2 {
            gates.remove(&note_id);
        }
    }

    #[cfg(test)]
    fn gate_count(&self) -> usize {
        self.gates.lock().unwrap().len()
    }
}
