//! Content handlers
//!
//! Topic listing is public. Topic and chapter detail resolve the caller from
//! an optional token and are gated per item.

use axum::{extract::State, Json};
use deck_core::{ChapterId, TopicId};
use deck_service::dto::{ChapterDetailResponse, TopicDetailResponse, TopicResponse};
use deck_service::{AccessService, ContentService};

use crate::extractors::{ClientContext, IdPath, MaybeClaims};
use crate::response::ApiResult;
use crate::state::AppState;

/// GET /topics
pub async fn list_topics(State(state): State<AppState>) -> ApiResult<Json<Vec<TopicResponse>>> {
    let topics = ContentService::new(state.service_context())
        .list_topics()
        .await?;
    Ok(Json(topics))
}

/// GET /topics/:topicId
pub async fn get_topic(
    State(state): State<AppState>,
    claims: MaybeClaims,
    ClientContext(client): ClientContext,
    IdPath(topic_id): IdPath<TopicId>,
) -> ApiResult<Json<TopicDetailResponse>> {
    let ctx = state.service_context();
    let caller = AccessService::new(ctx).resolve(claims.claims()).await?;

    let topic = ContentService::new(ctx)
        .get_topic(topic_id, &caller, &client.fingerprint)
        .await?;
    Ok(Json(topic))
}

/// GET /chapters/:chapterId
pub async fn get_chapter(
    State(state): State<AppState>,
    claims: MaybeClaims,
    ClientContext(client): ClientContext,
    IdPath(chapter_id): IdPath<ChapterId>,
) -> ApiResult<Json<ChapterDetailResponse>> {
    let ctx = state.service_context();
    let caller = AccessService::new(ctx).resolve(claims.claims()).await?;

    let chapter = ContentService::new(ctx)
        .get_chapter(chapter_id, &caller, &client.fingerprint)
        .await?;
    Ok(Json(chapter))
}
