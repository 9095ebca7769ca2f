//! Test fixtures and data generators

use chrono::Utc;
use deck_core::{Chapter, ChapterId, ContentId, Flashcard, Topic, TopicId};
use deck_db::MemoryContentRepository;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};

static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique suffix for usernames within one test binary
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupBody {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SignupBody {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            email: format!("{username}@x.com"),
            password: password.to_string(),
        }
    }

    pub fn unique() -> Self {
        Self::new(&format!("reader{}", unique_suffix()), "pw1")
    }

    pub fn login(&self) -> Value {
        json!({ "username": self.username, "password": self.password })
    }
}

pub fn username_body(username: &str) -> Value {
    json!({ "username": username })
}

/// Subset of the credential response body
#[derive(Debug, Deserialize)]
pub struct AuthBody {
    pub account: AccountBody,
    pub token_kind: String,
    pub expires_in: i64,
}

#[derive(Debug, Deserialize)]
pub struct AccountBody {
    pub id: String,
    pub username: String,
    pub role: String,
    pub subscription_status: String,
    pub device_locked: bool,
}

#[derive(Debug, Deserialize)]
pub struct OrderBody {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
}

/// Ids of the seeded catalogue
#[derive(Debug, Clone, Copy)]
pub struct Catalogue {
    pub free_topic: TopicId,
    pub premium_topic: TopicId,
    pub free_chapter: ChapterId,
    pub premium_chapter: ChapterId,
}

/// One free and one premium topic, one chapter each. The free chapter holds
/// one free and one premium flashcard.
pub fn seed_catalogue(content: &MemoryContentRepository) -> Catalogue {
    let now = Utc::now();
    let topic = |title: &str, is_premium: bool, position: i32| Topic {
        id: TopicId::generate(),
        title: title.to_string(),
        description: None,
        is_premium,
        position,
        created_at: now,
    };
    let free_topic = topic("Anatomy", false, 0);
    let premium_topic = topic("Pharmacology", true, 1);

    let chapter = |topic: &Topic, title: &str| Chapter {
        id: ChapterId::generate(),
        topic_id: topic.id,
        title: title.to_string(),
        is_premium: false,
        position: 0,
        created_at: now,
    };
    let free_chapter = chapter(&free_topic, "Bones");
    let premium_chapter = chapter(&premium_topic, "Antibiotics");

    for (position, is_premium) in [(0, false), (1, true)] {
        content.insert_flashcard(Flashcard {
            id: ContentId::generate(),
            chapter_id: free_chapter.id,
            question: format!("Question {position}"),
            answer: format!("Answer {position}"),
            is_premium,
            position,
        });
    }

    let catalogue = Catalogue {
        free_topic: free_topic.id,
        premium_topic: premium_topic.id,
        free_chapter: free_chapter.id,
        premium_chapter: premium_chapter.id,
    };

    content.insert_topic(free_topic);
    content.insert_topic(premium_topic);
    content.insert_chapter(free_chapter);
    content.insert_chapter(premium_chapter);

    catalogue
}
