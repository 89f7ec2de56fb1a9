use async_trait::async_trait;
use chrono::Utc;

use super::{MemoryStore, StoredUser};
use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::User;

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let mut tables = self.lock()?;

        for stored in tables.users.values() {
            if stored.user.username == input.username {
                return Err(DomainError::AlreadyExists("username".to_string()));
            }
            if stored.user.email == input.email {
                return Err(DomainError::AlreadyExists("email".to_string()));
            }
        }

        let id = tables.last_user_id + 1;
        let user = User::new(id, input.username, input.email, Utc::now())?;
        tables.last_user_id = id;
        tables.users.insert(
            id,
            StoredUser {
                user: user.clone(),
                password_hash: input.password_hash,
            },
        );
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, DomainError> {
        let tables = self.lock()?;
        Ok(tables
            .users
            .values()
            .find(|stored| stored.user.email == email)
            .map(|stored| UserCredentials {
                user: stored.user.clone(),
                password_hash: stored.password_hash.clone(),
            }))
    }
}
