use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::schemas::resource::{Resource, RESOURCES};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_resources))]
pub struct ResourcesApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/resources", get(get_resources))
}

/// Fixed list of self-help resources.
#[utoipa::path(
    get,
    path = "/resources",
    tag = "resources",
    responses(
        (status = 200, description = "Resource list", body = [Resource])
    )
)]
pub async fn get_resources() -> Json<[Resource; 2]> {
    Json(RESOURCES)
}
