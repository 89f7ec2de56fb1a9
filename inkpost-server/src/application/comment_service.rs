use tracing::{debug, info};

use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::post_repository::PostRepository;
use crate::domain::comment::{
    CommentNode, CommentWithAuthor, CreateCommentRequest, build_thread, ensure_reply_target,
};
use crate::domain::error::DomainError;

pub(crate) struct CommentService<C: CommentRepository, P: PostRepository> {
    comments: C,
    posts: P,
}

impl<C: CommentRepository, P: PostRepository> CommentService<C, P> {
    pub(crate) fn new(comments: C, posts: P) -> Self {
        Self { comments, posts }
    }

    pub(crate) async fn list_thread(&self, post_id: i64) -> Result<Vec<CommentNode>, DomainError> {
        let comments = self.comments.list_for_post(post_id).await?;
        Ok(build_thread(comments))
    }

    pub(crate) async fn create_comment(
        &self,
        author_id: i64,
        req: CreateCommentRequest,
    ) -> Result<CommentWithAuthor, DomainError> {
        let req = req.validate()?;

        if self.posts.get_post(req.post_id).await?.is_none() {
            return Err(DomainError::NotFound("post".to_string()));
        }
        if let Some(parent_id) = req.parent_id {
            let parent = self
                .comments
                .get_comment(parent_id)
                .await?
                .ok_or_else(comment_not_found)?;
            ensure_reply_target(&parent, req.post_id)?;
        }

        let created = self
            .comments
            .create_comment(NewComment {
                content: req.content,
                post_id: req.post_id,
                author_id,
                parent_id: req.parent_id,
            })
            .await?;
        info!(
            comment_id = created.comment.id,
            post_id = created.comment.post_id,
            parent_id = ?created.comment.parent_id,
            author_id,
            "comment created"
        );
        Ok(created)
    }

    pub(crate) async fn delete_comment(
        &self,
        actor_user_id: i64,
        comment_id: i64,
    ) -> Result<(), DomainError> {
        let comment = self
            .comments
            .get_comment(comment_id)
            .await?
            .ok_or_else(comment_not_found)?;

        if comment.author_id != actor_user_id {
            debug!(comment_id, actor_user_id, "comment owner mismatch");
            return Err(DomainError::Forbidden);
        }

        if !self.comments.delete_comment(comment_id).await? {
            return Err(comment_not_found());
        }
        info!(comment_id, "comment removed");
        Ok(())
    }
}

fn comment_not_found() -> DomainError {
    DomainError::NotFound("comment".to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::CommentService;
    use crate::data::comment_repository::{CommentRepository, NewComment};
    use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
    use crate::domain::comment::{Comment, CommentWithAuthor, CreateCommentRequest};
    use crate::domain::error::DomainError;
    use crate::domain::post::{Post, PostWithAuthor};
    use crate::domain::user::Author;

    #[derive(Clone, Default)]
    struct FakeCommentRepo {
        stored: Arc<Mutex<Vec<Comment>>>,
        created_input: Arc<Mutex<Option<NewComment>>>,
        deleted: Arc<Mutex<Vec<i64>>>,
    }

    impl FakeCommentRepo {
        fn with(comments: Vec<Comment>) -> Self {
            let repo = Self::default();
            *repo.stored.lock().expect("stored mutex poisoned") = comments;
            repo
        }

        fn created_input(&self) -> Option<NewComment> {
            self.created_input
                .lock()
                .expect("created_input mutex poisoned")
                .clone()
        }
    }

    #[async_trait]
    impl CommentRepository for FakeCommentRepo {
        async fn create_comment(
            &self,
            input: NewComment,
        ) -> Result<CommentWithAuthor, DomainError> {
            *self
                .created_input
                .lock()
                .expect("created_input mutex poisoned") = Some(input.clone());
            Ok(with_author(Comment {
                id: 100,
                content: input.content,
                post_id: input.post_id,
                author_id: input.author_id,
                parent_id: input.parent_id,
                created_at: Utc::now(),
            }))
        }

        async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
            Ok(self
                .stored
                .lock()
                .expect("stored mutex poisoned")
                .iter()
                .find(|comment| comment.id == id)
                .cloned())
        }

        async fn list_for_post(
            &self,
            post_id: i64,
        ) -> Result<Vec<CommentWithAuthor>, DomainError> {
            Ok(self
                .stored
                .lock()
                .expect("stored mutex poisoned")
                .iter()
                .filter(|comment| comment.post_id == post_id)
                .cloned()
                .map(with_author)
                .collect())
        }

        async fn delete_comment(&self, id: i64) -> Result<bool, DomainError> {
            self.deleted
                .lock()
                .expect("deleted mutex poisoned")
                .push(id);
            Ok(true)
        }
    }

    #[derive(Clone)]
    struct FakePostRepo {
        existing: Option<i64>,
    }

    #[async_trait]
    impl PostRepository for FakePostRepo {
        async fn create_post(&self, _input: NewPost) -> Result<PostWithAuthor, DomainError> {
            Err(DomainError::Unexpected("not used".to_string()))
        }

        async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
            if self.existing != Some(id) {
                return Ok(None);
            }
            let now = Utc::now();
            Ok(Some(Post {
                id,
                title: "Title".to_string(),
                content: "Content".to_string(),
                excerpt: None,
                slug: "title".to_string(),
                category: None,
                cover_image_url: None,
                published: true,
                author_id: 1,
                version: 1,
                created_at: now,
                updated_at: now,
            }))
        }

        async fn find_by_slug(&self, _slug: &str) -> Result<Option<PostWithAuthor>, DomainError> {
            Ok(None)
        }

        async fn list_published(&self) -> Result<Vec<PostWithAuthor>, DomainError> {
            Ok(Vec::new())
        }

        async fn update_post_owned(
            &self,
            _post_id: i64,
            _owner_id: i64,
            _patch: PostPatch,
            _expected_version: Option<i64>,
        ) -> Result<Option<PostWithAuthor>, DomainError> {
            Ok(None)
        }

        async fn delete_post(&self, _id: i64) -> Result<bool, DomainError> {
            Ok(false)
        }
    }

    fn service(
        comments: FakeCommentRepo,
        existing_post: Option<i64>,
    ) -> CommentService<FakeCommentRepo, FakePostRepo> {
        CommentService::new(
            comments,
            FakePostRepo {
                existing: existing_post,
            },
        )
    }

    #[tokio::test]
    async fn create_comment_on_missing_post_is_not_found() {
        let repo = FakeCommentRepo::default();
        let service = service(repo.clone(), None);

        let err = service
            .create_comment(1, request("nice post", 5, None))
            .await
            .expect_err("post is missing");
        assert!(matches!(err, DomainError::NotFound(ref what) if what == "post"));
        assert!(repo.created_input().is_none());
    }

    #[tokio::test]
    async fn create_top_level_comment_trims_content() {
        let repo = FakeCommentRepo::default();
        let service = service(repo.clone(), Some(5));

        let created = service
            .create_comment(1, request("  nice post  ", 5, None))
            .await
            .expect("comment must be created");
        assert_eq!(created.comment.content, "nice post");

        let input = repo.created_input().expect("repo input must be captured");
        assert_eq!(input.author_id, 1);
        assert_eq!(input.post_id, 5);
        assert!(input.parent_id.is_none());
    }

    #[tokio::test]
    async fn reply_to_missing_parent_is_not_found() {
        let service = service(FakeCommentRepo::default(), Some(5));

        let err = service
            .create_comment(1, request("reply", 5, Some(9)))
            .await
            .expect_err("parent is missing");
        assert!(matches!(err, DomainError::NotFound(ref what) if what == "comment"));
    }

    #[tokio::test]
    async fn reply_to_a_reply_is_rejected() {
        let repo = FakeCommentRepo::with(vec![comment(1, 5, None, 2), comment(2, 5, Some(1), 2)]);
        let service = service(repo.clone(), Some(5));

        let err = service
            .create_comment(1, request("deeper", 5, Some(2)))
            .await
            .expect_err("nested reply must fail");
        assert!(matches!(err, DomainError::Validation { field: "parent_id", .. }));
        assert!(repo.created_input().is_none());
    }

    #[tokio::test]
    async fn reply_across_posts_is_rejected() {
        let repo = FakeCommentRepo::with(vec![comment(1, 6, None, 2)]);
        let service = service(repo, Some(5));

        let err = service
            .create_comment(1, request("wrong post", 5, Some(1)))
            .await
            .expect_err("parent from another post must fail");
        assert!(matches!(err, DomainError::Validation { field: "parent_id", .. }));
    }

    #[tokio::test]
    async fn reply_to_top_level_comment_is_created() {
        let repo = FakeCommentRepo::with(vec![comment(1, 5, None, 2)]);
        let service = service(repo.clone(), Some(5));

        let created = service
            .create_comment(3, request("agreed", 5, Some(1)))
            .await
            .expect("reply must be created");
        assert_eq!(created.comment.parent_id, Some(1));
    }

    #[tokio::test]
    async fn list_thread_nests_replies() {
        let repo = FakeCommentRepo::with(vec![
            comment(1, 5, None, 2),
            comment(2, 5, Some(1), 3),
            comment(3, 7, None, 2),
        ]);
        let service = service(repo, Some(5));

        let thread = service.list_thread(5).await.expect("listing must succeed");
        assert_eq!(thread.len(), 1);
        assert_eq!(thread[0].replies.len(), 1);
        assert_eq!(thread[0].replies[0].comment.id, 2);

        assert!(service.list_thread(42).await.expect("listing").is_empty());
    }

    #[tokio::test]
    async fn delete_comment_checks_owner() {
        let repo = FakeCommentRepo::with(vec![comment(1, 5, None, 2)]);
        let service = service(repo.clone(), Some(5));

        let err = service
            .delete_comment(3, 1)
            .await
            .expect_err("must be forbidden");
        assert!(matches!(err, DomainError::Forbidden));

        service.delete_comment(2, 1).await.expect("owner may delete");
        assert_eq!(*repo.deleted.lock().expect("deleted mutex poisoned"), vec![1]);
    }

    #[tokio::test]
    async fn delete_missing_comment_is_not_found() {
        let service = service(FakeCommentRepo::default(), Some(5));
        let err = service.delete_comment(1, 77).await.expect_err("must fail");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    fn request(content: &str, post_id: i64, parent_id: Option<i64>) -> CreateCommentRequest {
        CreateCommentRequest {
            content: content.to_string(),
            post_id,
            parent_id,
        }
    }

    fn comment(id: i64, post_id: i64, parent_id: Option<i64>, author_id: i64) -> Comment {
        Comment {
            id,
            content: format!("comment {id}"),
            post_id,
            author_id,
            parent_id,
            created_at: Utc::now(),
        }
    }

    fn with_author(comment: Comment) -> CommentWithAuthor {
        let author = Author {
            id: comment.author_id,
            username: "alice".to_string(),
            display_name: None,
            bio: None,
            avatar_url: None,
        };
        CommentWithAuthor { comment, author }
    }
}
