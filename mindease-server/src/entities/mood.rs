use chrono::{DateTime, Utc};

use crate::db::{Direction, Document, FieldValue, Query};

/// Collection holding every logged mood entry.
pub const COLLECTION: &str = "moods";

/// Maximum number of entries returned by a history query.
pub const HISTORY_LIMIT: usize = 30;

/// A mood entry as persisted: `{user_id, mood_score, note, timestamp}`.
///
/// `mood_score` is meant to be 1–5 but is stored exactly as submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct MoodRecord {
    pub user_id: String,
    pub mood_score: i64,
    pub note: Option<String>,
    /// Server time at write.
    pub timestamp: DateTime<Utc>,
}

impl MoodRecord {
    /// An absent note is stored as an explicit null.
    pub fn into_document(self) -> Document {
        Document::from([
            ("user_id".to_owned(), FieldValue::from(self.user_id)),
            ("mood_score".to_owned(), FieldValue::from(self.mood_score)),
            ("note".to_owned(), FieldValue::from(self.note)),
            ("timestamp".to_owned(), FieldValue::from(self.timestamp)),
        ])
    }
}

/// The most recent [`HISTORY_LIMIT`] entries of `user_id`, newest first.
pub fn history_query(user_id: &str) -> Query {
    Query::collection(COLLECTION)
        .where_eq("user_id", user_id)
        .order_by("timestamp", Direction::Descending)
        .limit(HISTORY_LIMIT)
}
