use tracing::{debug, info};

use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{CreatePostRequest, Post, PostWithAuthor, UpdatePostRequest};

pub(crate) struct BlogService<R: PostRepository> {
    repo: R,
}

impl<R: PostRepository> BlogService<R> {
    pub(crate) fn new(repo: R) -> Self {
        Self { repo }
    }

    pub(crate) async fn list_posts(&self) -> Result<Vec<PostWithAuthor>, DomainError> {
        self.repo.list_published().await
    }

    pub(crate) async fn get_post_by_slug(
        &self,
        slug: &str,
        viewer: Option<i64>,
    ) -> Result<PostWithAuthor, DomainError> {
        match self.repo.find_by_slug(slug.trim()).await? {
            Some(found) if found.post.is_visible_to(viewer) => Ok(found),
            _ => Err(post_not_found()),
        }
    }

    pub(crate) async fn create_post(
        &self,
        author_id: i64,
        req: CreatePostRequest,
    ) -> Result<PostWithAuthor, DomainError> {
        let req = req.validate()?;

        let new_post = NewPost {
            title: req.title,
            content: req.content,
            excerpt: req.excerpt,
            slug: req.slug,
            category: req.category,
            cover_image_url: req.cover_image_url,
            published: req.published,
            author_id,
        };
        let created = self.repo.create_post(new_post).await?;
        info!(
            post_id = created.post.id,
            author_id,
            slug = %created.post.slug,
            "post created"
        );
        Ok(created)
    }

    pub(crate) async fn update_post(
        &self,
        actor_user_id: i64,
        post_id: i64,
        req: UpdatePostRequest,
    ) -> Result<PostWithAuthor, DomainError> {
        self.load_owned(actor_user_id, post_id).await?;
        let req = req.validate()?;

        let expected_version = req.expected_version;
        let patch = PostPatch {
            title: req.title,
            content: req.content,
            excerpt: req.excerpt,
            slug: req.slug,
            category: req.category,
            cover_image_url: req.cover_image_url,
            published: req.published,
        };

        match self
            .repo
            .update_post_owned(post_id, actor_user_id, patch, expected_version)
            .await?
        {
            Some(updated) => {
                info!(post_id, version = updated.post.version, "post updated");
                Ok(updated)
            }
            // пост исчез или его версия успела измениться
            None => match self.repo.get_post(post_id).await? {
                None => Err(post_not_found()),
                Some(current) if current.author_id != actor_user_id => Err(DomainError::Forbidden),
                Some(current) => {
                    debug!(
                        post_id,
                        current_version = current.version,
                        ?expected_version,
                        "stale post version"
                    );
                    Err(DomainError::AlreadyExists("post version".to_string()))
                }
            },
        }
    }

    pub(crate) async fn delete_post(
        &self,
        actor_user_id: i64,
        post_id: i64,
    ) -> Result<(), DomainError> {
        self.load_owned(actor_user_id, post_id).await?;

        let deleted = self.repo.delete_post(post_id).await?;
        if !deleted {
            return Err(post_not_found());
        }
        info!(post_id, "post removed");
        Ok(())
    }

    pub(crate) async fn ensure_owner(
        &self,
        actor_user_id: i64,
        post_id: i64,
    ) -> Result<(), DomainError> {
        self.load_owned(actor_user_id, post_id).await.map(|_| ())
    }

    async fn load_owned(&self, actor_user_id: i64, post_id: i64) -> Result<Post, DomainError> {
        let post = self
            .repo
            .get_post(post_id)
            .await?
            .ok_or_else(post_not_found)?;

        if post.author_id != actor_user_id {
            debug!(post_id, actor_user_id, "post owner mismatch");
            return Err(DomainError::Forbidden);
        }
        Ok(post)
    }
}

fn post_not_found() -> DomainError {
    DomainError::NotFound("post".to_string())
}
