use reqwest::{Client, Method, RequestBuilder};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{BlogClientError, BlogClientResult};
use crate::models::{Comment, CommentNode, NewComment, NewPost, Post, PostChanges};
use crate::session::{Session, SessionUser};

#[derive(Debug, Serialize)]
struct RegisterRequestDto<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequestDto<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    error: Option<String>,
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponseDto {
    token: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponseDto {
    token: String,
    user: SessionUser,
}

impl From<TokenResponseDto> for Session {
    fn from(value: TokenResponseDto) -> Self {
        Session::new(value.token)
    }
}

impl From<LoginResponseDto> for Session {
    fn from(value: LoginResponseDto) -> Self {
        Self {
            token: value.token,
            user: Some(value.user),
        }
    }
}

#[derive(Debug, Clone)]
/// HTTP-клиент для работы с REST API `inkpost-server`.
pub(crate) struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    pub(crate) fn new(base_url: impl Into<String>) -> BlogClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let request = self.client.request(method, self.endpoint(path));
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn decode_error(response: reqwest::Response) -> BlogClientError {
        let status = response.status();

        let (code, message) = match response.json::<ErrorResponseDto>().await {
            Ok(body) => (
                body.code,
                body.error.unwrap_or_else(|| format!("http status {status}")),
            ),
            Err(_) => (None, format!("http status {status}")),
        };
        BlogClientError::from_response(status, code.as_deref(), message)
    }

    async fn execute<TRes>(request: RequestBuilder) -> BlogClientResult<TRes>
    where
        TRes: DeserializeOwned,
    {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }

        Ok(response.json::<TRes>().await?)
    }

    /// универсальный helper для отправки запросов с json-payload
    async fn send_json<TReq, TRes>(
        &self,
        method: Method,
        path: &str,
        body: &TReq,
        token: Option<&str>,
    ) -> BlogClientResult<TRes>
    where
        TReq: Serialize,
        TRes: DeserializeOwned,
    {
        Self::execute(self.request(method, path, token).json(body)).await
    }

    async fn send_empty<TRes>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
    ) -> BlogClientResult<TRes>
    where
        TRes: DeserializeOwned,
    {
        Self::execute(self.request(method, path, token)).await
    }

    pub(crate) async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> BlogClientResult<Session> {
        let payload = RegisterRequestDto {
            username,
            email,
            password,
        };
        let dto: TokenResponseDto = self
            .send_json(Method::POST, "/api/auth/register", &payload, None)
            .await?;
        Ok(dto.into())
    }

    pub(crate) async fn login(&self, email: &str, password: &str) -> BlogClientResult<Session> {
        let payload = LoginRequestDto { email, password };
        let dto: LoginResponseDto = self
            .send_json(Method::POST, "/api/auth/login", &payload, None)
            .await?;
        Ok(dto.into())
    }

    pub(crate) async fn list_posts(&self) -> BlogClientResult<Vec<Post>> {
        self.send_empty(Method::GET, "/api/posts", None).await
    }

    pub(crate) async fn get_post(&self, slug: &str, token: Option<&str>) -> BlogClientResult<Post> {
        self.send_empty(Method::GET, &format!("/api/posts/{slug}"), token)
            .await
    }

    pub(crate) async fn create_post(&self, token: &str, post: &NewPost) -> BlogClientResult<Post> {
        self.send_json(Method::POST, "/api/posts", post, Some(token))
            .await
    }

    pub(crate) async fn update_post(
        &self,
        token: &str,
        id: i64,
        changes: &PostChanges,
    ) -> BlogClientResult<Post> {
        self.send_json(
            Method::PUT,
            &format!("/api/posts/{id}"),
            changes,
            Some(token),
        )
        .await
    }

    pub(crate) async fn delete_post(&self, token: &str, id: i64) -> BlogClientResult<()> {
        let _: IgnoredAny = self
            .send_empty(Method::DELETE, &format!("/api/posts/{id}"), Some(token))
            .await?;
        Ok(())
    }

    pub(crate) async fn list_comments(&self, post_id: i64) -> BlogClientResult<Vec<CommentNode>> {
        self.send_empty(Method::GET, &format!("/api/comments/post/{post_id}"), None)
            .await
    }

    pub(crate) async fn create_comment(
        &self,
        token: &str,
        comment: &NewComment,
    ) -> BlogClientResult<Comment> {
        self.send_json(Method::POST, "/api/comments", comment, Some(token))
            .await
    }

    pub(crate) async fn delete_comment(&self, token: &str, id: i64) -> BlogClientResult<()> {
        let _: IgnoredAny = self
            .send_empty(Method::DELETE, &format!("/api/comments/{id}"), Some(token))
            .await?;
        Ok(())
    }
}
