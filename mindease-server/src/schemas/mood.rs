use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::entities::MoodRecord;

/// Request body for `POST /mood`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct MoodEntryRequest {
    pub user_id: String,
    /// Intended scale is 1–5; any integer is accepted, so no range rule.
    pub mood_score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Accepted in any form and always replaced by server time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub timestamp: Option<serde_json::Value>,
}

impl MoodEntryRequest {
    pub fn into_record(self, now: DateTime<Utc>) -> MoodRecord {
        MoodRecord {
            user_id: self.user_id,
            mood_score: self.mood_score,
            note: self.note,
            timestamp: now,
        }
    }
}

/// Response body for `POST /mood`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MoodLoggedResponse {
    pub status: String,
    pub message: String,
}

impl MoodLoggedResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_owned(),
            message: "Mood logged successfully".to_owned(),
        }
    }
}
