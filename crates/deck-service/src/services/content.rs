//! Content service
//!
//! Read-side delivery of topics and chapters. Every gate goes through
//! [`AccessService::authorize`].

use deck_core::{ChapterId, DeviceFingerprint, DomainError, TopicId};
use tracing::{debug, instrument};

use crate::dto::{
    ChapterDetailResponse, ChapterSummaryResponse, FlashcardResponse, NoteResponse,
    TopicDetailResponse, TopicResponse,
};

use super::access::{AccessService, ResolvedCaller};
use super::context::ServiceContext;
use super::error::ServiceResult;

/// Content service
pub struct ContentService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ContentService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Public topic metadata, premium flag included
    #[instrument(skip(self))]
    pub async fn list_topics(&self) -> ServiceResult<Vec<TopicResponse>> {
        let topics = self.ctx.content_repo().list_topics().await?;
        Ok(topics.iter().map(TopicResponse::from).collect())
    }

    /// Topic with its chapter list, gated by the topic's premium flag
    #[instrument(skip(self, caller, fingerprint))]
    pub async fn get_topic(
        &self,
        id: TopicId,
        caller: &ResolvedCaller,
        fingerprint: &DeviceFingerprint,
    ) -> ServiceResult<TopicDetailResponse> {
        let topic = self
            .ctx
            .content_repo()
            .find_topic(id)
            .await?
            .ok_or(DomainError::TopicNotFound(id))?;

        let access = AccessService::new(self.ctx);
        AccessService::ensure(access.authorize(caller, topic.is_premium, fingerprint))?;

        let chapters = self.ctx.content_repo().list_chapters(id).await?;

        Ok(TopicDetailResponse {
            topic: TopicResponse::from(&topic),
            chapters: chapters.iter().map(ChapterSummaryResponse::from).collect(),
        })
    }

    /// Chapter with its flashcards and notes.
    ///
    /// The chapter is premium if it or its topic is. Inside an accessible
    /// chapter, premium items are withheld from callers without entitlement
    /// and only counted.
    #[instrument(skip(self, caller, fingerprint))]
    pub async fn get_chapter(
        &self,
        id: ChapterId,
        caller: &ResolvedCaller,
        fingerprint: &DeviceFingerprint,
    ) -> ServiceResult<ChapterDetailResponse> {
        let repo = self.ctx.content_repo();
        let chapter = repo
            .find_chapter(id)
            .await?
            .ok_or(DomainError::ChapterNotFound(id))?;
        let topic = repo
            .find_topic(chapter.topic_id)
            .await?
            .ok_or(DomainError::TopicNotFound(chapter.topic_id))?;

        let access = AccessService::new(self.ctx);
        let decision = access.authorize(caller, chapter.is_premium_within(&topic), fingerprint);
        AccessService::ensure(decision)?;

        let premium_items = access.authorize(caller, true, fingerprint);
        let show_premium = premium_items.is_granted();

        let (flashcards, locked_cards): (Vec<_>, Vec<_>) = repo
            .list_flashcards(id)
            .await?
            .into_iter()
            .partition(|card| show_premium || !card.is_premium);
        let (notes, locked_notes): (Vec<_>, Vec<_>) = repo
            .list_notes(id)
            .await?
            .into_iter()
            .partition(|note| show_premium || !note.is_premium);

        let locked_items = locked_cards.len() + locked_notes.len();
        if locked_items > 0 {
            debug!(locked_items, reason = ?premium_items, "Premium items withheld");
        }

        Ok(ChapterDetailResponse {
            topic_id: topic.id,
            chapter: ChapterSummaryResponse::from(&chapter),
            flashcards: flashcards.into_iter().map(FlashcardResponse::from).collect(),
            notes: notes.into_iter().map(NoteResponse::from).collect(),
            locked_items,
            access: decision,
        })
    }
}
