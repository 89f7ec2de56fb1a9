use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::post::{Category, Post, PostWithAuthor};

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) excerpt: Option<String>,
    pub(crate) slug: String,
    pub(crate) category: Option<Category>,
    pub(crate) cover_image_url: Option<String>,
    pub(crate) published: bool,
    pub(crate) author_id: i64,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PostPatch {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) excerpt: Option<Option<String>>,
    pub(crate) slug: Option<String>,
    pub(crate) category: Option<Option<Category>>,
    pub(crate) cover_image_url: Option<Option<String>>,
    pub(crate) published: Option<bool>,
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<PostWithAuthor, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostWithAuthor>, DomainError>;
    async fn list_published(&self) -> Result<Vec<PostWithAuthor>, DomainError>;
    // только для владельца и совпадающей expected_version, если она задана; version растёт
    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
        expected_version: Option<i64>,
    ) -> Result<Option<PostWithAuthor>, DomainError>;
    async fn delete_post(&self, id: i64) -> Result<bool, DomainError>;
}

#[async_trait]
impl<T: PostRepository + ?Sized> PostRepository for Arc<T> {
    async fn create_post(&self, input: NewPost) -> Result<PostWithAuthor, DomainError> {
        (**self).create_post(input).await
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        (**self).get_post(id).await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostWithAuthor>, DomainError> {
        (**self).find_by_slug(slug).await
    }

    async fn list_published(&self) -> Result<Vec<PostWithAuthor>, DomainError> {
        (**self).list_published().await
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
        expected_version: Option<i64>,
    ) -> Result<Option<PostWithAuthor>, DomainError> {
        (**self)
            .update_post_owned(post_id, owner_id, patch, expected_version)
            .await
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        (**self).delete_post(id).await
    }
}
