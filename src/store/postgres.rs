use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::models::{Note, NoteFields, NoteSummary};
use crate::store::{NoteStore, StoreError};

const RECENT_LIMIT: i64 = 50;

/// PostgreSQL-backed note store.
pub struct PgNoteStore {
    pool: PgPool,
}

impl PgNoteStore {
    /// Create the connection pool and ensure the notes table exists.
    ///
    /// # Arguments
    /// * `database_url` - PostgreSQL connection string
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        info!("Connecting to database...");

        let pool = PgPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .connect(database_url)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS notes (
                id UUID PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL DEFAULT '',
                tags TEXT[] NOT NULL DEFAULT '{}',
                is_pinned BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL,
                last_edited_by TEXT NOT NULL DEFAULT 'Anonymous'
            )
            "#,
        )
        .execute(&pool)
        .await?;

        info!("Database connection pool created successfully");

        Ok(Self { pool })
    }
}

#[async_trait]
impl NoteStore for PgNoteStore {
    async fn load(&self, id: Uuid) -> Result<Option<Note>, StoreError> {
        let note = sqlx::query_as::<_, Note>("SELECT * FROM notes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(note)
    }

    async fn apply_update(
        &self,
        id: Uuid,
        fields: &NoteFields,
        editor: &str,
    ) -> Result<Option<Note>, StoreError> {
        // Single statement keeps the read-modify-write atomic per note id;
        // COALESCE leaves unsupplied fields untouched.
        let note = sqlx::query_as::<_, Note>(
            r#"
            UPDATE notes SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                tags = COALESCE($4, tags),
                updated_at = $5,
                last_edited_by = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(fields.title.as_deref())
        .bind(fields.content.as_deref())
        .bind(fields.tags.as_deref())
        .bind(Utc::now())
        .bind(editor)
        .fetch_optional(&self.pool)
        .await?;
        Ok(note)
    }

    async fn create(&self, title: &str, content: &str, author: &str) -> Result<Note, StoreError> {
        let now = Utc::now();
        let note = sqlx::query_as::<_, Note>(
            r#"
            INSERT INTO notes (id, title, content, tags, is_pinned, created_at, updated_at, last_edited_by)
            VALUES ($1, $2, $3, '{}', FALSE, $4, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(content)
        .bind(now)
        .bind(author)
        .fetch_one(&self.pool)
        .await?;
        Ok(note)
    }

    async fn list_recent(&self) -> Result<Vec<NoteSummary>, StoreError> {
        let notes = sqlx::query_as::<_, NoteSummary>(
            r#"
            SELECT id, title, is_pinned, updated_at, last_edited_by
            FROM notes
            ORDER BY is_pinned DESC, updated_at DESC
            LIMIT $1
            "#,
        )
        .bind(RECENT_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        Ok(notes)
    }

    async fn search(&self, query: &str) -> Result<Vec<NoteSummary>, StoreError> {
        let pattern = format!(
            "%{}%",
            query.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
        );
        let notes = sqlx::query_as::<_, NoteSummary>(
            r#"
            SELECT id, title, is_pinned, updated_at, last_edited_by
            FROM notes
            WHERE title ILIKE $1
               OR content ILIKE $1
               OR EXISTS (SELECT 1 FROM unnest(tags) AS tag WHERE tag ILIKE $1)
            ORDER BY is_pinned DESC, updated_at DESC
            LIMIT $2
            "#,
        )
        .bind(pattern)
        .bind(RECENT_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        Ok(notes)
    }

    async fn toggle_pin(&self, id: Uuid) -> Result<Option<Note>, StoreError> {
        let note = sqlx::query_as::<_, Note>(
            "UPDATE notes SET is_pinned = NOT is_pinned WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(note)
    }
}
