//! Chat replies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reply to a question about a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatReply {
    /// Reply stamped with the current time
    pub fn now(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            timestamp: Utc::now(),
        }
    }
}
