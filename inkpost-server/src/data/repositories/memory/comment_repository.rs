use async_trait::async_trait;
use chrono::Utc;

use super::MemoryStore;
use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::domain::comment::{Comment, CommentWithAuthor};
use crate::domain::error::DomainError;

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create_comment(&self, input: NewComment) -> Result<CommentWithAuthor, DomainError> {
        let mut tables = self.lock()?;

        if !tables.posts.contains_key(&input.post_id) {
            return Err(DomainError::NotFound("post".to_string()));
        }
        if let Some(parent_id) = input.parent_id
            && !tables.comments.contains_key(&parent_id)
        {
            return Err(DomainError::NotFound("comment".to_string()));
        }
        let author = tables.author(input.author_id)?;

        let id = tables.last_comment_id + 1;
        let comment = Comment {
            id,
            content: input.content,
            post_id: input.post_id,
            author_id: input.author_id,
            parent_id: input.parent_id,
            created_at: Utc::now(),
        };
        tables.last_comment_id = id;
        tables.comments.insert(id, comment.clone());

        Ok(CommentWithAuthor { comment, author })
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
        Ok(self.lock()?.comments.get(&id).cloned())
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentWithAuthor>, DomainError> {
        let tables = self.lock()?;
        let mut comments = tables
            .comments
            .values()
            .filter(|comment| comment.post_id == post_id)
            .map(|comment| {
                Ok(CommentWithAuthor {
                    comment: comment.clone(),
                    author: tables.author(comment.author_id)?,
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;
        comments.sort_by_key(|entry| (entry.comment.created_at, entry.comment.id));
        Ok(comments)
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError> {
        let mut tables = self.lock()?;
        if tables.comments.remove(&id).is_none() {
            return Ok(false);
        }
        for reply in tables
            .comments
            .values_mut()
            .filter(|comment| comment.parent_id == Some(id))
        {
            reply.parent_id = None;
        }
        Ok(true)
    }
}
