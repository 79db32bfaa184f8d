use chrono::{DateTime, Utc};

use crate::db::{Document, FieldValue};

/// Collection holding every submitted chat message.
pub const COLLECTION: &str = "chats";

/// A chat message as persisted: `{content, user_id, timestamp}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRecord {
    pub content: String,
    pub user_id: String,
    /// Server time at write.
    pub timestamp: DateTime<Utc>,
}

impl ChatRecord {
    pub fn into_document(self) -> Document {
        Document::from([
            ("content".to_owned(), FieldValue::from(self.content)),
            ("user_id".to_owned(), FieldValue::from(self.user_id)),
            ("timestamp".to_owned(), FieldValue::from(self.timestamp)),
        ])
    }
}
