use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::entities::ChatRecord;

const PLACEHOLDER_REPLY: &str =
    "I understand you're feeling this way. Would you like to talk more about it?";
const PLACEHOLDER_SENTIMENT: &str = "neutral";

/// Request body for `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct ChatMessageRequest {
    /// Message text.
    #[validate(length(min = 1, message = "must not be empty"))]
    pub content: String,
    /// Opaque identifier of the author.
    pub user_id: String,
    /// Accepted in any form and always replaced by server time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub timestamp: Option<serde_json::Value>,
}

impl ChatMessageRequest {
    /// Persistable record stamped with `now`. A client timestamp is discarded.
    pub fn into_record(self, now: DateTime<Utc>) -> ChatRecord {
        ChatRecord {
            content: self.content,
            user_id: self.user_id,
            timestamp: now,
        }
    }
}

/// Response body for `POST /chat`.
///
/// Always the same placeholder text; it does not depend on the message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChatReply {
    pub message: String,
    pub sentiment: String,
}

impl ChatReply {
    pub fn placeholder() -> Self {
        Self {
            message: PLACEHOLDER_REPLY.to_owned(),
            sentiment: PLACEHOLDER_SENTIMENT.to_owned(),
        }
    }
}
