//! Клиентская библиотека для работы с inkpost-server по HTTP.
//!
//! Предоставляет `BlogClient` поверх REST API и локальные представления:
//! - ленту постов с поиском, фильтром категории, сортировкой и пагинацией
//!   (`PostFeed`);
//! - тред комментариев (`CommentThread`);
//! - детальную страницу поста (`PostDetailView`).
//!
//! Состояние авторизации хранится в явном значении `Session`, которое
//! передаётся в каждую защищённую операцию.
#![warn(missing_docs)]

mod error;
mod http_client;
mod models;
mod session;
mod views;

pub use error::{BlogClientError, BlogClientResult};
pub use models::{Author, Comment, CommentNode, NewComment, NewPost, Post, PostChanges};
pub use session::{Session, SessionUser};
pub use views::{
    ALL_CATEGORIES, CommentThread, FeedPage, POSTS_PER_PAGE, PostDetailView, PostFeed, PostFilter,
    SortOrder, slugify, total_pages,
};

use http_client::HttpClient;

#[derive(Debug, Clone)]
/// Клиент блог-сервиса.
pub struct BlogClient {
    http_client: HttpClient,
}

impl BlogClient {
    /// Создаёт клиент для сервера с базовым URL, например `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> BlogClientResult<Self> {
        Ok(Self {
            http_client: HttpClient::new(base_url)?,
        })
    }

    /// Регистрирует пользователя и возвращает сессию с токеном.
    ///
    /// Сервер при регистрации не возвращает данные пользователя, поэтому
    /// `Session::user` остаётся пустым.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> BlogClientResult<Session> {
        self.http_client.register(username, email, password).await
    }

    /// Выполняет вход по email и паролю.
    pub async fn login(&self, email: &str, password: &str) -> BlogClientResult<Session> {
        self.http_client.login(email, password).await
    }

    /// Возвращает все опубликованные посты, сначала новые.
    pub async fn list_posts(&self) -> BlogClientResult<Vec<Post>> {
        self.http_client.list_posts().await
    }

    /// Загружает ленту для локальной фильтрации.
    pub async fn load_feed(&self) -> BlogClientResult<PostFeed> {
        Ok(PostFeed::new(self.list_posts().await?))
    }

    /// Получает пост по slug.
    ///
    /// Черновик доступен только автору, поэтому сессия передаётся, если она есть.
    pub async fn get_post(&self, slug: &str, session: Option<&Session>) -> BlogClientResult<Post> {
        self.http_client
            .get_post(slug, session.map(|s| s.token.as_str()))
            .await
    }

    /// Создаёт пост от имени пользователя сессии.
    pub async fn create_post(&self, session: &Session, post: &NewPost) -> BlogClientResult<Post> {
        self.http_client.create_post(&session.token, post).await
    }

    /// Обновляет пост по идентификатору.
    pub async fn update_post(
        &self,
        session: &Session,
        id: i64,
        changes: &PostChanges,
    ) -> BlogClientResult<Post> {
        self.http_client
            .update_post(&session.token, id, changes)
            .await
    }

    /// Удаляет пост вместе с комментариями.
    pub async fn delete_post(&self, session: &Session, id: i64) -> BlogClientResult<()> {
        self.http_client.delete_post(&session.token, id).await
    }

    /// Возвращает тред комментариев поста.
    pub async fn list_comments(&self, post_id: i64) -> BlogClientResult<CommentThread> {
        Ok(CommentThread::new(
            self.http_client.list_comments(post_id).await?,
        ))
    }

    /// Добавляет комментарий или ответ на комментарий верхнего уровня.
    pub async fn create_comment(
        &self,
        session: &Session,
        comment: &NewComment,
    ) -> BlogClientResult<Comment> {
        self.http_client
            .create_comment(&session.token, comment)
            .await
    }

    /// Удаляет комментарий; ответы на него остаются без родителя.
    pub async fn delete_comment(&self, session: &Session, id: i64) -> BlogClientResult<()> {
        self.http_client.delete_comment(&session.token, id).await
    }

    /// Загружает пост по slug, затем его комментарии.
    pub async fn load_post_detail(
        &self,
        slug: &str,
        session: Option<&Session>,
    ) -> BlogClientResult<PostDetailView> {
        let post = self.get_post(slug, session).await?;
        let thread = self.list_comments(post.id).await?;
        Ok(PostDetailView { post, thread })
    }
}
