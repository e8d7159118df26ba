use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Note, NoteFields, NoteSummary};
use crate::store::{NoteStore, StoreError};

const RECENT_LIMIT: usize = 50;

/// In-memory note store. Used when no database URL is configured and by
/// the test suite. The write lock spans each read-modify-write, which
/// keeps `apply_update` atomic per note id.
#[derive(Default)]
pub struct MemoryNoteStore {
    notes: RwLock<HashMap<Uuid, Note>>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a note with a fixed id. Test helper.
    pub async fn insert(&self, note: Note) {
        self.notes.write().await.insert(note.id, note);
    }
}

fn summaries(notes: impl Iterator<Item = Note>) -> Vec<NoteSummary> {
    let mut all: Vec<NoteSummary> = notes.map(|n| NoteSummary::from(&n)).collect();
    all.sort_by(|a, b| {
        b.is_pinned
            .cmp(&a.is_pinned)
            .then(b.updated_at.cmp(&a.updated_at))
    });
    all.truncate(RECENT_LIMIT);
    all
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn load(&self, id: Uuid) -> Result<Option<Note>, StoreError> {
        Ok(self.notes.read().await.get(&id).cloned())
    }

    async fn apply_update(
        &self,
        id: Uuid,
        fields: &NoteFields,
        editor: &str,
    ) -> Result<Option<Note>, StoreError> {
        let mut notes = self.notes.write().await;
        let Some(note) = notes.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = &fields.title {
            note.title = title.clone();
        }
        if let Some(content) = &fields.content {
            note.content = content.clone();
        }
        if let Some(tags) = &fields.tags {
            note.tags = tags.clone();
        }
        note.updated_at = Utc::now();
        note.last_edited_by = editor.to_string();
        Ok(Some(note.clone()))
    }

    async fn create(&self, title: &str, content: &str, author: &str) -> Result<Note, StoreError> {
        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            tags: Vec::new(),
            is_pinned: false,
            created_at: now,
            updated_at: now,
            last_edited_by: author.to_string(),
        };
        self.notes.write().await.insert(note.id, note.clone());
        Ok(note)
    }

    async fn list_recent(&self) -> Result<Vec<NoteSummary>, StoreError> {
        Ok(summaries(self.notes.read().await.values().cloned()))
    }

    async fn search(&self, query: &str) -> Result<Vec<NoteSummary>, StoreError> {
        let needle = query.to_lowercase();
        let notes = self.notes.read().await;
        let matches = notes.values().filter(|n| {
            n.title.to_lowercase().contains(&needle)
                || n.content.to_lowercase().contains(&needle)
                || n.tags.iter().any(|t| t.to_lowercase().contains(&needle))
        });
        Ok(summaries(matches.cloned()))
    }

    async fn toggle_pin(&self, id: Uuid) -> Result<Option<Note>, StoreError> {
        let mut notes = self.notes.write().await;
        let Some(note) = notes.get_mut(&id) else {
            return Ok(None);
        };
        note.is_pinned = !note.is_pinned;
        Ok(Some(note.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sparse_update_leaves_other_fields_alone() {
        let store = MemoryNoteStore::new();
        let note = store.create("Groceries", "milk", "Alice").await.unwrap();

        let fields = NoteFields {
            content: Some("milk, eggs".to_string()),
            ..Default::default()
        };
        let updated = store
            .apply_update(note.id, &fields, "Bob")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "Groceries");
        assert_eq!(updated.content, "milk, eggs");
        assert_eq!(updated.last_edited_by, "Bob");
        assert!(updated.updated_at >= note.updated_at);
    }

    #[tokio::test]
    async fn update_of_missing_note_is_none() {
        let store = MemoryNoteStore::new();
        let fields = NoteFields {
            content: Some("x".to_string()),
            ..Default::default()
        };
        let res = store.apply_update(Uuid::new_v4(), &fields, "Bob").await.unwrap();
        assert!(res.is_none());
    }

    #[tokio::test]
    async fn search_matches_title_content_and_tags() {
        let store = MemoryNoteStore::new();
        let a = store.create("Meeting notes", "agenda", "Alice").await.unwrap();
        let b = store.create("Shopping", "buy a notebook", "Alice").await.unwrap();
        let c = store.create("Misc", "nothing here", "Alice").await.unwrap();
        store
            .apply_update(
                c.id,
                &NoteFields {
                    tags: Some(vec!["notes".to_string()]),
                    ..Default::default()
                },
                "Alice",
            )
            .await
            .unwrap();

        let hits = store.search("note").await.unwrap();
        let ids: Vec<Uuid> = hits.iter().map(|s| s.id).collect();
        assert!(ids.contains(&a.id));
        assert!(ids.contains(&b.id));
        assert!(ids.contains(&c.id));
    }

    #[tokio::test]
    async fn pinned_notes_list_first() {
        let store = MemoryNoteStore::new();
        let older = store.create("Older", "", "Alice").await.unwrap();
        let _newer = store.create("Newer", "", "Alice").await.unwrap();
        store.toggle_pin(older.id).await.unwrap().unwrap();

        let listing = store.list_recent().await.unwrap();
        assert_eq!(listing[0].id, older.id);
        assert!(listing[0].is_pinned);
    }

    #[tokio::test]
    async fn toggle_pin_flips_without_touching_stamps() {
        let store = MemoryNoteStore::new();
        let note = store.create("Pin me", "", "Alice").await.unwrap();

        let pinned = store.toggle_pin(note.id).await.unwrap().unwrap();
        assert!(pinned.is_pinned);
        assert_eq!(pinned.updated_at, note.updated_at);

        let unpinned = store.toggle_pin(note.id).await.unwrap().unwrap();
        assert!(!unpinned.is_pinned);
    }
}
