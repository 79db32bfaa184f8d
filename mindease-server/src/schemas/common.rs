use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WelcomeResponse {
    pub message: String,
}

impl WelcomeResponse {
    pub fn welcome() -> Self {
        Self {
            message: "Welcome to MindEase API".to_owned(),
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Name of the active document store backend.
    pub store: String,
}

/// Envelope of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
