use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::post::AuthorRef;
use super::rules::required_text;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Comment {
    pub(crate) id: i64,
    pub(crate) text: String,
    pub(crate) author: AuthorRef,
    pub(crate) post_id: i64,
    pub(crate) created_at: DateTime<Utc>,
}

/// Only the text comes from the client; author, post and creation time
/// are assigned by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CommentForm {
    pub(crate) text: String,
}

impl CommentForm {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            text: required_text("text", &self.text, None)?,
        })
    }
}
