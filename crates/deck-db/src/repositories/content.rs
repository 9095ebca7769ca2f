//! PostgreSQL implementation of ContentRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use deck_core::entities::{Chapter, Flashcard, Note, Topic};
use deck_core::traits::{ContentRepository, RepoResult};
use deck_core::value_objects::{ChapterId, TopicId};

use crate::models::{ChapterModel, FlashcardModel, NoteModel, TopicModel};

use super::error::map_db_error;

/// PostgreSQL implementation of ContentRepository
#[derive(Clone)]
pub struct PgContentRepository {
    pool: PgPool,
}

impl PgContentRepository {
    /// Create a new PgContentRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentRepository for PgContentRepository {
    #[instrument(skip(self))]
    async fn list_topics(&self) -> RepoResult<Vec<Topic>> {
        let rows = sqlx::query_as::<_, TopicModel>(
            r"
            SELECT id, title, description, is_premium, position, created_at
            FROM topics
            ORDER BY position, title
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Topic::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_topic(&self, id: TopicId) -> RepoResult<Option<Topic>> {
        let row = sqlx::query_as::<_, TopicModel>(
            r"
            SELECT id, title, description, is_premium, position, created_at
            FROM topics
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(Topic::from))
    }

    #[instrument(skip(self))]
    async fn list_chapters(&self, topic_id: TopicId) -> RepoResult<Vec<Chapter>> {
        let rows = sqlx::query_as::<_, ChapterModel>(
            r"
            SELECT id, topic_id, title, is_premium, position, created_at
            FROM chapters
            WHERE topic_id = $1
            ORDER BY position, title
            ",
        )
        .bind(topic_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Chapter::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_chapter(&self, id: ChapterId) -> RepoResult<Option<Chapter>> {
        let row = sqlx::query_as::<_, ChapterModel>(
            r"
            SELECT id, topic_id, title, is_premium, position, created_at
            FROM chapters
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(Chapter::from))
    }

    #[instrument(skip(self))]
    async fn list_flashcards(&self, chapter_id: ChapterId) -> RepoResult<Vec<Flashcard>> {
        let rows = sqlx::query_as::<_, FlashcardModel>(
            r"
            SELECT id, chapter_id, question, answer, is_premium, position
            FROM flashcards
            WHERE chapter_id = $1
            ORDER BY position, id
            ",
        )
        .bind(chapter_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Flashcard::from).collect())
    }

    #[instrument(skip(self))]
    async fn list_notes(&self, chapter_id: ChapterId) -> RepoResult<Vec<Note>> {
        let rows = sqlx::query_as::<_, NoteModel>(
            r"
            SELECT id, chapter_id, title, body, is_premium, position
            FROM notes
            WHERE chapter_id = $1
            ORDER BY position, id
            ",
        )
        .bind(chapter_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Note::from).collect())
    }
}
