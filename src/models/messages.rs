use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::note::{default_editor, Note};
use crate::models::presence::Presence;

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct JoinNotePayload {
    pub note_id: Uuid,
    #[serde(default = "default_editor")]
    pub user_name: String,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NoteUpdatePayload {
    pub note_id: Uuid,
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    #[serde(default = "default_editor")]
    pub user_name: String,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub note_id: Uuid,
    #[serde(default = "default_editor")]
    pub user_name: String,
}

/// Messages arriving from a client over the collaboration socket
#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "join_note")]
    JoinNote(JoinNotePayload),
    #[serde(rename = "note_update")]
    NoteUpdate(NoteUpdatePayload),
    #[serde(rename = "typing_start")]
    TypingStart(TypingPayload),
    #[serde(rename = "typing_stop")]
    TypingStop(TypingPayload),
}

/// Fields broadcast to a room after a persisted edit. Only the fields
/// the editor actually supplied are present, plus the server stamps.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NoteUpdatedPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub last_edited_by: String,
    pub updated_by: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserTypingPayload {
    pub user_name: String,
    pub is_typing: bool,
}

/// Messages sent to clients over the collaboration socket
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "note_loaded")]
    NoteLoaded { note: Note },
    #[serde(rename = "note_updated")]
    NoteUpdated(NoteUpdatedPayload),
    #[serde(rename = "active_users")]
    ActiveUsers { users: Vec<Presence> },
    #[serde(rename = "user_typing")]
    UserTyping(UserTypingPayload),
    #[serde(rename = "error")]
    Error { message: String },
}
