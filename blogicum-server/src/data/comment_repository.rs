use async_trait::async_trait;

use crate::data::post_repository::Pagination;
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct NewComment {
    pub(crate) text: String,
    pub(crate) author_id: i64,
    pub(crate) post_id: i64,
}

#[async_trait]
pub(crate) trait CommentRepository: Send + Sync {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError>;
    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError>;
    async fn update_comment(&self, id: i64, text: String) -> Result<Option<Comment>, DomainError>;
    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError>;
    /// Oldest first.
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<Comment>, DomainError>;
    /// Newest first, across all posts.
    async fn list_comments(&self, pagination: Pagination) -> Result<Vec<Comment>, DomainError>;
}
