use std::sync::Arc;
use uuid::Uuid;

use crate::models::TypingPayload;
use crate::AppState;

/// Handle typing_start / typing_stop. Pure pass-through, nothing kept.
pub fn handle_typing_message(
    typing_msg: &TypingPayload,
    is_typing: bool,
    connection_id: Uuid,
    app_state: &Arc<AppState>,
) {
    if is_typing {
        app_state
            .typing
            .typing_start(connection_id, typing_msg.note_id, &typing_msg.user_name);
    } else {
        app_state
            .typing
            .typing_stop(connection_id, typing_msg.note_id, &typing_msg.user_name);
    }
}
