//! Chat message intake.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use tracing::info;
use utoipa::OpenApi;

use crate::entities::chat;
use crate::error::ServerError;
use crate::extract::ValidatedJson;
use crate::schemas::chat::{ChatMessageRequest, ChatReply};
use crate::schemas::common::ErrorResponse;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(post_chat))]
pub struct ChatApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(post_chat))
}

/// Store a chat message and return the placeholder reply.
#[utoipa::path(
    post,
    path = "/chat",
    tag = "chat",
    request_body = ChatMessageRequest,
    responses(
        (status = 200, description = "Message stored", body = ChatReply),
        (status = 422, description = "Invalid request body", body = ErrorResponse),
        (status = 500, description = "Document store failure", body = ErrorResponse),
    )
)]
pub async fn post_chat(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<ChatMessageRequest>,
) -> Result<Json<ChatReply>, ServerError> {
    let record = req.into_record(Utc::now());
    let user_id = record.user_id.clone();
    let id = state
        .store
        .create(chat::COLLECTION, record.into_document())
        .await?;
    info!(%user_id, document_id = %id, "chat message stored");
    Ok(Json(ChatReply::placeholder()))
}
