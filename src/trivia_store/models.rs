use serde::{Deserialize, Serialize};

/// A stored trivia question, serialized in the shape the API exposes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

/// A question about to be inserted, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    /// Display label, exposed as `type` on the wire.
    #[serde(rename = "type")]
    pub kind: String,
}
