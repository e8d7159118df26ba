use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::models::{JoinNotePayload, ServerMessage};
use crate::AppState;

/// Handle a join_note message.
///
/// Membership switches first (atomically leaving any previous room),
/// then the note is loaded and delivered to the joiner alone, then the
/// whole room - joiner included - gets the fresh presence list. A note
/// the store does not know still registers presence; the joiner simply
/// receives no payload.
pub async fn handle_join_message(
    join_msg: &JoinNotePayload,
    connection_id: Uuid,
    app_state: &Arc<AppState>,
) {
    info!(
        "Join message received for note {}: user={}",
        join_msg.note_id, join_msg.user_name
    );

    app_state
        .registry
        .join(connection_id, join_msg.note_id, &join_msg.user_name);

    // The load is a suspension point: the joiner may be gone by the time
    // it completes, in which case the delivery below is dropped silently.
    match app_state.store.load(join_msg.note_id).await {
        Ok(Some(note)) => {
            app_state
                .registry
                .send_to(connection_id, ServerMessage::NoteLoaded { note });
        }
        Ok(None) => {
            info!(
                "Note {} not found at join; presence registered without a payload",
                join_msg.note_id
            );
        }
        Err(e) => {
            error!("Failed to load note {}: {}", join_msg.note_id, e);
            app_state.registry.send_to(
                connection_id,
                ServerMessage::Error {
                    message: "Failed to join note".to_string(),
                },
            );
        }
    }

    app_state.registry.broadcast_presence(join_msg.note_id);
}
