//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use chrono::{DateTime, Utc};
use deck_core::entities::{
    Account, Chapter, DeviceLock, Flashcard, LoginAttempt, Note, SessionRecord, Topic,
};

use super::responses::{
    AccountResponse, ChapterSummaryResponse, DeviceLockResponse, FlashcardResponse,
    LoginAttemptResponse, NoteResponse, SessionInfoResponse, TopicResponse,
};

// ============================================================================
// Account Mappers
// ============================================================================

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            role: account.role,
            subscription_status: account.subscription_status,
            subscription_expires_at: account.subscription_expires_at,
            total_paid: account.total_paid,
            device_locked: account.has_device_lock(),
            created_at: account.created_at,
        }
    }
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self::from(&account)
    }
}

impl SessionInfoResponse {
    /// Describe a session as seen at `now`
    pub fn at(session: &SessionRecord, now: DateTime<Utc>) -> Self {
        Self {
            login_at: session.login_at,
            last_activity_at: session.last_activity_at,
            expires_at: session.expires_at,
            ip_address: session.ip_address.clone(),
            user_agent: session.user_agent.clone(),
            device_fingerprint: session.device_fingerprint.as_str().to_string(),
            active: !session.is_expired(now),
        }
    }
}

impl From<&DeviceLock> for DeviceLockResponse {
    fn from(lock: &DeviceLock) -> Self {
        Self {
            fingerprint: lock.fingerprint.as_str().to_string(),
            locked_at: lock.locked_at,
        }
    }
}

impl From<&LoginAttempt> for LoginAttemptResponse {
    fn from(attempt: &LoginAttempt) -> Self {
        Self {
            outcome: attempt.outcome,
            ip_address: attempt.ip_address.clone(),
            user_agent: attempt.user_agent.clone(),
            device_fingerprint: attempt.device_fingerprint.as_str().to_string(),
            attempted_at: attempt.attempted_at,
        }
    }
}

// ============================================================================
// Content Mappers
// ============================================================================

impl From<&Topic> for TopicResponse {
    fn from(topic: &Topic) -> Self {
        Self {
            id: topic.id,
            title: topic.title.clone(),
            description: topic.description.clone(),
            is_premium: topic.is_premium,
            position: topic.position,
        }
    }
}

impl From<&Chapter> for ChapterSummaryResponse {
    fn from(chapter: &Chapter) -> Self {
        Self {
            id: chapter.id,
            title: chapter.title.clone(),
            is_premium: chapter.is_premium,
            position: chapter.position,
        }
    }
}

impl From<Flashcard> for FlashcardResponse {
    fn from(card: Flashcard) -> Self {
        Self {
            id: card.id,
            question: card.question,
            answer: card.answer,
            is_premium: card.is_premium,
        }
    }
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            body: note.body,
            is_premium: note.is_premium,
        }
    }
}
