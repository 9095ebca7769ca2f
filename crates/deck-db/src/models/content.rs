//! Content database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct TopicModel {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_premium: bool,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ChapterModel {
    pub id: Uuid,
    pub topic_id: Uuid,
    pub title: String,
    pub is_premium: bool,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct FlashcardModel {
    pub id: Uuid,
    pub chapter_id: Uuid,
    pub question: String,
    pub answer: String,
    pub is_premium: bool,
    pub position: i32,
}

#[derive(Debug, Clone, FromRow)]
pub struct NoteModel {
    pub id: Uuid,
    pub chapter_id: Uuid,
    pub title: String,
    pub body: String,
    pub is_premium: bool,
    pub position: i32,
}
