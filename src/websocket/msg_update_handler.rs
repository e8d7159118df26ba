use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::{CollabError, NoteFields, NoteUpdatePayload, ServerMessage};
use crate::AppState;

/// Handle a note_update message. Failures go back to the sender only.
pub async fn handle_update_message(
    update_msg: NoteUpdatePayload,
    connection_id: Uuid,
    app_state: &Arc<AppState>,
) {
    info!(
        "Update message received for note {}: user={}",
        update_msg.note_id, update_msg.user_name
    );

    let fields = NoteFields {
        title: update_msg.title,
        content: update_msg.content,
        tags: update_msg.tags,
    };

    if let Err(e) = app_state
        .coordinator
        .update(connection_id, update_msg.note_id, fields, &update_msg.user_name)
        .await
    {
        match &e {
            CollabError::Store(cause) => {
                error!("Store failure updating note {}: {}", update_msg.note_id, cause)
            }
            other => warn!("Update rejected for note {}: {}", update_msg.note_id, other),
        }
        app_state.registry.send_to(
            connection_id,
            ServerMessage::Error {
                message: e.to_string(),
            },
        );
    }
}
