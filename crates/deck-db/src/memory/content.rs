//! In-memory ContentRepository

use async_trait::async_trait;
use dashmap::DashMap;

use deck_core::entities::{Chapter, Flashcard, Note, Topic};
use deck_core::traits::{ContentRepository, RepoResult};
use deck_core::value_objects::{ChapterId, TopicId};

/// Content tree held in memory. Seeded through the `insert_*` methods.
#[derive(Default)]
pub struct MemoryContentRepository {
    topics: DashMap<TopicId, Topic>,
    chapters: DashMap<ChapterId, Chapter>,
    flashcards: DashMap<ChapterId, Vec<Flashcard>>,
    notes: DashMap<ChapterId, Vec<Note>>,
}

impl MemoryContentRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_topic(&self, topic: Topic) {
        self.topics.insert(topic.id, topic);
    }

    pub fn insert_chapter(&self, chapter: Chapter) {
        self.chapters.insert(chapter.id, chapter);
    }

    pub fn insert_flashcard(&self, card: Flashcard) {
        self.flashcards.entry(card.chapter_id).or_default().push(card);
    }

    pub fn insert_note(&self, note: Note) {
        self.notes.entry(note.chapter_id).or_default().push(note);
    }
}

#[async_trait]
impl ContentRepository for MemoryContentRepository {
    async fn list_topics(&self) -> RepoResult<Vec<Topic>> {
        let mut topics: Vec<Topic> = self.topics.iter().map(|t| t.value().clone()).collect();
        topics.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.title.cmp(&b.title)));
        Ok(topics)
    }

    async fn find_topic(&self, id: TopicId) -> RepoResult<Option<Topic>> {
        Ok(self.topics.get(&id).map(|t| t.value().clone()))
    }

    async fn list_chapters(&self, topic_id: TopicId) -> RepoResult<Vec<Chapter>> {
        let mut chapters: Vec<Chapter> = self
            .chapters
            .iter()
            .filter(|c| c.topic_id == topic_id)
            .map(|c| c.value().clone())
            .collect();
        chapters.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.title.cmp(&b.title)));
        Ok(chapters)
    }

    async fn find_chapter(&self, id: ChapterId) -> RepoResult<Option<Chapter>> {
        Ok(self.chapters.get(&id).map(|c| c.value().clone()))
    }

    async fn list_flashcards(&self, chapter_id: ChapterId) -> RepoResult<Vec<Flashcard>> {
        let mut cards = self
            .flashcards
            .get(&chapter_id)
            .map(|cards| cards.value().clone())
            .unwrap_or_default();
        cards.sort_by_key(|card| card.position);
        Ok(cards)
    }

    async fn list_notes(&self, chapter_id: ChapterId) -> RepoResult<Vec<Note>> {
        let mut notes = self
            .notes
            .get(&chapter_id)
            .map(|notes| notes.value().clone())
            .unwrap_or_default();
        notes.sort_by_key(|note| note.position);
        Ok(notes)
    }
}
