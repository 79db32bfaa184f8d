//! Mood logging and history.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::Value;
use tracing::info;
use utoipa::OpenApi;

use crate::db::Document;
use crate::entities::mood;
use crate::error::ServerError;
use crate::extract::ValidatedJson;
use crate::schemas::common::ErrorResponse;
use crate::schemas::mood::{MoodEntryRequest, MoodLoggedResponse};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(post_mood, get_mood_history))]
pub struct MoodApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/mood", post(post_mood))
        .route("/mood/history/{user_id}", get(get_mood_history))
}

/// Log a mood entry. Scores outside 1–5 are stored unchanged.
#[utoipa::path(
    post,
    path = "/mood",
    tag = "mood",
    request_body = MoodEntryRequest,
    responses(
        (status = 200, description = "Mood logged", body = MoodLoggedResponse),
        (status = 422, description = "Invalid request body", body = ErrorResponse),
        (status = 500, description = "Document store failure", body = ErrorResponse),
    )
)]
pub async fn post_mood(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<MoodEntryRequest>,
) -> Result<Json<MoodLoggedResponse>, ServerError> {
    let record = req.into_record(Utc::now());
    let user_id = record.user_id.clone();
    let mood_score = record.mood_score;
    let id = state
        .store
        .create(mood::COLLECTION, record.into_document())
        .await?;
    info!(%user_id, mood_score, document_id = %id, "mood logged");
    Ok(Json(MoodLoggedResponse::success()))
}

/// The user's 30 most recent mood entries, newest first, as stored.
#[utoipa::path(
    get,
    path = "/mood/history/{user_id}",
    tag = "mood",
    params(("user_id" = String, Path, description = "Owner of the entries")),
    responses(
        (status = 200, description = "Mood entries, newest first", body = Vec<Value>),
        (status = 500, description = "Document store failure", body = ErrorResponse),
    )
)]
pub async fn get_mood_history(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Document>>, ServerError> {
    let docs = state.store.query(&mood::history_query(&user_id)).await?;
    info!(%user_id, count = docs.len(), "mood history fetched");
    Ok(Json(docs.into_iter().map(|doc| doc.fields).collect()))
}
