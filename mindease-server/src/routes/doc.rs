use utoipa::OpenApi;

use crate::routes::{chat, health, mood, resources};

#[derive(OpenApi)]
#[openapi(info(
    title = "mindease-server",
    description = "MindEase mental-wellness API",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(chat::ChatApi::openapi());
    root.merge(mood::MoodApi::openapi());
    root.merge(resources::ResourcesApi::openapi());
    root
}
