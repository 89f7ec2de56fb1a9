use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::user::{Author, User};

mod comment_repository;
mod post_repository;
mod user_repository;

#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, StoredUser>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    last_user_id: i64,
    last_post_id: i64,
    last_comment_id: i64,
}

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, DomainError> {
        self.tables
            .lock()
            .map_err(|_| DomainError::Unexpected("memory store lock poisoned".to_string()))
    }
}

impl Tables {
    fn author(&self, user_id: i64) -> Result<Author, DomainError> {
        self.users
            .get(&user_id)
            .map(|stored| stored.user.author())
            .ok_or_else(|| DomainError::NotFound("author".to_string()))
    }
}
