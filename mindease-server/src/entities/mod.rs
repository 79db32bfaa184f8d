//! Domain records and how they map onto store documents.
//!
//! Records are written once and never updated; query helpers describe how
//! they are read back.

pub mod chat;
pub mod mood;

pub use chat::ChatRecord;
pub use mood::MoodRecord;
