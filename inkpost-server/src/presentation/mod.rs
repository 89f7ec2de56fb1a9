use std::sync::Arc;

use sqlx::PgPool;

use crate::application::auth_service::AuthService;
use crate::application::blog_service::BlogService;
use crate::application::comment_service::CommentService;
use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::data::repositories::memory::MemoryStore;
use crate::data::repositories::postgres::comment_repository::PostgresCommentRepository;
use crate::data::repositories::postgres::post_repository::PostgresPostRepository;
use crate::data::repositories::postgres::user_repository::PostgresUserRepository;
use crate::data::user_repository::UserRepository;
use crate::infrastructure::jwt::JwtService;

pub(crate) mod http;

pub(crate) type SharedUserRepository = Arc<dyn UserRepository>;
pub(crate) type SharedPostRepository = Arc<dyn PostRepository>;
pub(crate) type SharedCommentRepository = Arc<dyn CommentRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth_service: Arc<AuthService<SharedUserRepository>>,
    pub(crate) blog_service: Arc<BlogService<SharedPostRepository>>,
    pub(crate) comment_service:
        Arc<CommentService<SharedCommentRepository, SharedPostRepository>>,
    pub(crate) jwt: Arc<JwtService>,
}

impl AppState {
    pub(crate) fn new(
        users: SharedUserRepository,
        posts: SharedPostRepository,
        comments: SharedCommentRepository,
        jwt: Arc<JwtService>,
    ) -> Self {
        Self {
            auth_service: Arc::new(AuthService::new(users, jwt.clone())),
            blog_service: Arc::new(BlogService::new(posts.clone())),
            comment_service: Arc::new(CommentService::new(comments, posts)),
            jwt,
        }
    }

    pub(crate) fn with_postgres(pool: PgPool, jwt: Arc<JwtService>) -> Self {
        Self::new(
            Arc::new(PostgresUserRepository::new(pool.clone())),
            Arc::new(PostgresPostRepository::new(pool.clone())),
            Arc::new(PostgresCommentRepository::new(pool)),
            jwt,
        )
    }

    pub(crate) fn in_memory(jwt: Arc<JwtService>) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store.clone(), store, jwt)
    }
}
