//! Study content - topics, chapters, flashcards and notes
//!
//! Content is plain data here; the only field the access policy reads is
//! `is_premium`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ChapterId, ContentId, TopicId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub title: String,
    pub description: Option<String>,
    pub is_premium: bool,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: ChapterId,
    pub topic_id: TopicId,
    pub title: String,
    pub is_premium: bool,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: ContentId,
    pub chapter_id: ChapterId,
    pub question: String,
    pub answer: String,
    pub is_premium: bool,
    pub position: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: ContentId,
    pub chapter_id: ChapterId,
    pub title: String,
    pub body: String,
    pub is_premium: bool,
    pub position: i32,
}

impl Chapter {
    /// A chapter is sensitive when it or its topic is flagged premium
    pub fn is_premium_within(&self, topic: &Topic) -> bool {
        self.is_premium || topic.is_premium
    }
}
