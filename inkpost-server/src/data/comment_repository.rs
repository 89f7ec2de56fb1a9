use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::comment::{Comment, CommentWithAuthor};
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct NewComment {
    pub(crate) content: String,
    pub(crate) post_id: i64,
    pub(crate) author_id: i64,
    pub(crate) parent_id: Option<i64>,
}

#[async_trait]
pub(crate) trait CommentRepository: Send + Sync {
    async fn create_comment(&self, input: NewComment) -> Result<CommentWithAuthor, DomainError>;
    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError>;
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentWithAuthor>, DomainError>;
    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError>;
}

#[async_trait]
impl<T: CommentRepository + ?Sized> CommentRepository for Arc<T> {
    async fn create_comment(&self, input: NewComment) -> Result<CommentWithAuthor, DomainError> {
        (**self).create_comment(input).await
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
        (**self).get_comment(id).await
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentWithAuthor>, DomainError> {
        (**self).list_for_post(post_id).await
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError> {
        (**self).delete_comment(id).await
    }
}
