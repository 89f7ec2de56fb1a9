use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::warn;

use super::error::DomainError;
use super::user::Author;

const CONTENT_MAX_CHARS: usize = 2000;

#[derive(Debug, Clone)]
pub(crate) struct Comment {
    pub(crate) id: i64,
    pub(crate) content: String,
    pub(crate) post_id: i64,
    pub(crate) author_id: i64,
    pub(crate) parent_id: Option<i64>,
    pub(crate) created_at: DateTime<Utc>,
}

impl Comment {
    pub(crate) fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CommentWithAuthor {
    pub(crate) comment: Comment,
    pub(crate) author: Author,
}

#[derive(Debug, Clone)]
pub(crate) struct CommentNode {
    pub(crate) comment: CommentWithAuthor,
    pub(crate) replies: Vec<CommentWithAuthor>,
}

#[derive(Debug, Clone)]
pub(crate) struct CreateCommentRequest {
    pub(crate) content: String,
    pub(crate) post_id: i64,
    pub(crate) parent_id: Option<i64>,
}

impl CreateCommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let content = self.content.trim();
        if content.is_empty() || content.chars().count() > CONTENT_MAX_CHARS {
            return Err(DomainError::validation("content", "must be 1..2000 chars"));
        }
        if self.post_id <= 0 {
            return Err(DomainError::validation("post_id", "must be > 0"));
        }
        if matches!(self.parent_id, Some(id) if id <= 0) {
            return Err(DomainError::validation("parent_id", "must be > 0"));
        }
        Ok(Self {
            content: content.to_string(),
            post_id: self.post_id,
            parent_id: self.parent_id,
        })
    }
}

pub(crate) fn ensure_reply_target(parent: &Comment, post_id: i64) -> Result<(), DomainError> {
    if parent.post_id != post_id {
        return Err(DomainError::validation(
            "parent_id",
            "parent comment belongs to another post",
        ));
    }
    if !parent.is_top_level() {
        return Err(DomainError::validation(
            "parent_id",
            "replies cannot be nested",
        ));
    }
    Ok(())
}

// ответ без родителя верхнего уровня в этой выборке выводится как комментарий верхнего уровня
pub(crate) fn build_thread(comments: Vec<CommentWithAuthor>) -> Vec<CommentNode> {
    let top_level_ids: HashSet<i64> = comments
        .iter()
        .filter(|entry| entry.comment.is_top_level())
        .map(|entry| entry.comment.id)
        .collect();

    let mut nodes: Vec<CommentNode> = Vec::new();
    let mut positions: HashMap<i64, usize> = HashMap::new();
    let mut replies: Vec<(i64, CommentWithAuthor)> = Vec::new();

    for entry in comments {
        match entry.comment.parent_id {
            Some(parent_id) if top_level_ids.contains(&parent_id) => {
                replies.push((parent_id, entry));
            }
            parent_id => {
                if let Some(parent_id) = parent_id {
                    warn!(
                        comment_id = entry.comment.id,
                        parent_id, "reply without a top-level parent in thread"
                    );
                }
                positions.insert(entry.comment.id, nodes.len());
                nodes.push(CommentNode {
                    comment: entry,
                    replies: Vec::new(),
                });
            }
        }
    }

    for (parent_id, reply) in replies {
        if let Some(&position) = positions.get(&parent_id) {
            nodes[position].replies.push(reply);
        }
    }

    nodes
}
