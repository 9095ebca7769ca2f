//! Content entity <-> model mappers

use deck_core::{Chapter, ChapterId, ContentId, Flashcard, Note, Topic, TopicId};

use crate::models::{ChapterModel, FlashcardModel, NoteModel, TopicModel};

impl From<TopicModel> for Topic {
    fn from(model: TopicModel) -> Self {
        Topic {
            id: TopicId::new(model.id),
            title: model.title,
            description: model.description,
            is_premium: model.is_premium,
            position: model.position,
            created_at: model.created_at,
        }
    }
}

impl From<ChapterModel> for Chapter {
    fn from(model: ChapterModel) -> Self {
        Chapter {
            id: ChapterId::new(model.id),
            topic_id: TopicId::new(model.topic_id),
            title: model.title,
            is_premium: model.is_premium,
            position: model.position,
            created_at: model.created_at,
        }
    }
}

impl From<FlashcardModel> for Flashcard {
    fn from(model: FlashcardModel) -> Self {
        Flashcard {
            id: ContentId::new(model.id),
            chapter_id: ChapterId::new(model.chapter_id),
            question: model.question,
            answer: model.answer,
            is_premium: model.is_premium,
            position: model.position,
        }
    }
}

impl From<NoteModel> for Note {
    fn from(model: NoteModel) -> Self {
        Note {
            id: ContentId::new(model.id),
            chapter_id: ChapterId::new(model.chapter_id),
            title: model.title,
            body: model.body,
            is_premium: model.is_premium,
            position: model.position,
        }
    }
}
