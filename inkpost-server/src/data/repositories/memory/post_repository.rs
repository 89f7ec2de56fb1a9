use std::cmp::Reverse;

use async_trait::async_trait;
use chrono::Utc;

use super::MemoryStore;
use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostWithAuthor};

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create_post(&self, input: NewPost) -> Result<PostWithAuthor, DomainError> {
        let mut tables = self.lock()?;

        if tables.posts.values().any(|post| post.slug == input.slug) {
            return Err(DomainError::AlreadyExists("slug".to_string()));
        }
        let author = tables.author(input.author_id)?;

        let id = tables.last_post_id + 1;
        let now = Utc::now();
        let post = Post {
            id,
            title: input.title,
            content: input.content,
            excerpt: input.excerpt,
            slug: input.slug,
            category: input.category,
            cover_image_url: input.cover_image_url,
            published: input.published,
            author_id: input.author_id,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        tables.last_post_id = id;
        tables.posts.insert(id, post.clone());

        Ok(PostWithAuthor { post, author })
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        Ok(self.lock()?.posts.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PostWithAuthor>, DomainError> {
        let tables = self.lock()?;
        tables
            .posts
            .values()
            .find(|post| post.slug == slug)
            .map(|post| {
                Ok(PostWithAuthor {
                    post: post.clone(),
                    author: tables.author(post.author_id)?,
                })
            })
            .transpose()
    }

    async fn list_published(&self) -> Result<Vec<PostWithAuthor>, DomainError> {
        let tables = self.lock()?;
        let mut posts = tables
            .posts
            .values()
            .filter(|post| post.published)
            .map(|post| {
                Ok(PostWithAuthor {
                    post: post.clone(),
                    author: tables.author(post.author_id)?,
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;
        posts.sort_by_key(|entry| Reverse((entry.post.created_at, entry.post.id)));
        Ok(posts)
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
        expected_version: Option<i64>,
    ) -> Result<Option<PostWithAuthor>, DomainError> {
        let mut tables = self.lock()?;

        let Some(current) = tables.posts.get(&post_id) else {
            return Ok(None);
        };
        if current.author_id != owner_id
            || expected_version.is_some_and(|version| version != current.version)
        {
            return Ok(None);
        }
        if let Some(slug) = &patch.slug {
            let taken = tables
                .posts
                .values()
                .any(|post| post.id != post_id && &post.slug == slug);
            if taken {
                return Err(DomainError::AlreadyExists("slug".to_string()));
            }
        }

        let author = tables.author(owner_id)?;
        let Some(post) = tables.posts.get_mut(&post_id) else {
            return Ok(None);
        };
        apply_patch(post, patch);
        post.version += 1;
        post.updated_at = Utc::now().max(post.created_at);

        Ok(Some(PostWithAuthor {
            post: post.clone(),
            author,
        }))
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let mut tables = self.lock()?;
        if tables.posts.remove(&id).is_none() {
            return Ok(false);
        }
        tables.comments.retain(|_, comment| comment.post_id != id);
        Ok(true)
    }
}

fn apply_patch(post: &mut Post, patch: PostPatch) {
    if let Some(title) = patch.title {
        post.title = title;
    }
    if let Some(content) = patch.content {
        post.content = content;
    }
    if let Some(excerpt) = patch.excerpt {
        post.excerpt = excerpt;
    }
    if let Some(slug) = patch.slug {
        post.slug = slug;
    }
    if let Some(category) = patch.category {
        post.category = category;
    }
    if let Some(cover_image_url) = patch.cover_image_url {
        post.cover_image_url = cover_image_url;
    }
    if let Some(published) = patch.published {
        post.published = published;
    }
}
