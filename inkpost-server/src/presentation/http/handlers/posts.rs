use axum::{
    Json,
    extract::State,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{AuthorDto, MessageDto, double_option};
use crate::domain::error::DomainError;
use crate::domain::post::{Category, CreatePostRequest, PostWithAuthor, UpdatePostRequest};
use crate::domain::user::Author;
use crate::presentation::AppState;
use crate::presentation::http::app_error::{AppResult, ErrorBody};
use crate::presentation::http::json::JsonBody;
use crate::presentation::http::path::PathParam;
use crate::presentation::http::middleware::auth::{AuthenticatedUser, MaybeAuthenticated};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreatePostDto {
    #[validate(length(min = 1, max = 200))]
    pub(crate) title: String,
    #[validate(length(min = 1))]
    pub(crate) content: String,
    #[validate(length(max = 500))]
    pub(crate) excerpt: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub(crate) slug: String,
    pub(crate) category: Option<String>,
    #[serde(alias = "coverImageUrl")]
    #[validate(length(max = 2048))]
    pub(crate) cover_image_url: Option<String>,
    #[serde(default)]
    pub(crate) published: bool,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub(crate) struct UpdatePostDto {
    #[validate(length(min = 1, max = 200))]
    pub(crate) title: Option<String>,
    #[validate(length(min = 1))]
    pub(crate) content: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub(crate) excerpt: Option<Option<String>>,
    #[validate(length(min = 1, max = 200))]
    pub(crate) slug: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub(crate) category: Option<Option<String>>,
    #[serde(default, alias = "coverImageUrl", deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub(crate) cover_image_url: Option<Option<String>>,
    pub(crate) published: Option<bool>,
    #[serde(alias = "expectedVersion")]
    #[validate(range(min = 1))]
    pub(crate) expected_version: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) excerpt: Option<String>,
    pub(crate) slug: String,
    pub(crate) category: Option<String>,
    pub(crate) cover_image_url: Option<String>,
    pub(crate) published: bool,
    pub(crate) version: i64,
    pub(crate) author_id: i64,
    pub(crate) author: AuthorDto,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl PostDto {
    fn with_author_view(entry: PostWithAuthor, view: fn(Author) -> AuthorDto) -> Self {
        let PostWithAuthor { post, author } = entry;
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            excerpt: post.excerpt,
            slug: post.slug,
            category: post.category.map(|category| category.as_str().to_string()),
            cover_image_url: post.cover_image_url,
            published: post.published,
            version: post.version,
            author_id: post.author_id,
            author: view(author),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }

    pub(crate) fn summary(entry: PostWithAuthor) -> Self {
        Self::with_author_view(entry, AuthorDto::summary)
    }

    pub(crate) fn detail(entry: PostWithAuthor) -> Self {
        Self::with_author_view(entry, AuthorDto::profile)
    }
}

fn parse_category(raw: Option<String>) -> Result<Option<Category>, DomainError> {
    raw.filter(|value| !value.trim().is_empty())
        .map(|value| value.parse::<Category>())
        .transpose()
}

impl TryFrom<CreatePostDto> for CreatePostRequest {
    type Error = DomainError;

    fn try_from(dto: CreatePostDto) -> Result<Self, Self::Error> {
        Ok(Self {
            title: dto.title,
            content: dto.content,
            excerpt: dto.excerpt,
            slug: dto.slug,
            category: parse_category(dto.category)?,
            cover_image_url: dto.cover_image_url,
            published: dto.published,
        })
    }
}

impl TryFrom<UpdatePostDto> for UpdatePostRequest {
    type Error = DomainError;

    fn try_from(dto: UpdatePostDto) -> Result<Self, Self::Error> {
        Ok(Self {
            title: dto.title,
            content: dto.content,
            excerpt: dto.excerpt,
            slug: dto.slug,
            category: dto.category.map(parse_category).transpose()?,
            cover_image_url: dto.cover_image_url,
            published: dto.published,
            expected_version: dto.expected_version,
        })
    }
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    responses(
        (status = 200, description = "Published posts, newest first", body = Vec<PostDto>),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn list_posts(State(state): State<AppState>) -> AppResult<Json<Vec<PostDto>>> {
    let posts = state.blog_service.list_posts().await?;
    Ok(Json(posts.into_iter().map(PostDto::summary).collect()))
}

#[utoipa::path(
    get,
    path = "/api/posts/{slug}",
    tag = "posts",
    security(
        (),
        ("bearer_auth" = [])
    ),
    params(
        ("slug" = String, Path, description = "Post slug")
    ),
    responses(
        (status = 200, description = "Post found; drafts only for their author", body = PostDto),
        (status = 404, description = "Post not found", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    viewer: MaybeAuthenticated,
    PathParam(slug): PathParam<String>,
) -> AppResult<Json<PostDto>> {
    let post = state
        .blog_service
        .get_post_by_slug(&slug, viewer.user_id())
        .await?;

    Ok(Json(PostDto::detail(post)))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreatePostDto,
    responses(
        (status = 200, description = "Post created", body = PostDto),
        (status = 400, description = "Validation error or slug already exists", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    JsonBody(dto): JsonBody<CreatePostDto>,
) -> AppResult<Json<PostDto>> {
    dto.validate()?;
    let req = CreatePostRequest::try_from(dto)?;

    let result = state.blog_service.create_post(auth.user_id, req).await?;
    Ok(Json(PostDto::summary(result)))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Post updated", body = PostDto),
        (status = 400, description = "Validation error, slug taken or stale version", body = ErrorBody),
        (status = 401, description = "Unauthorized or not the author", body = ErrorBody),
        (status = 404, description = "Post not found", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    PathParam(id): PathParam<i64>,
    JsonBody(dto): JsonBody<UpdatePostDto>,
) -> AppResult<Json<PostDto>> {
    // 404 и 401 важнее ошибок тела запроса
    state.blog_service.ensure_owner(auth.user_id, id).await?;
    dto.validate()?;
    let req = UpdatePostRequest::try_from(dto)?;

    let result = state
        .blog_service
        .update_post(auth.user_id, id, req)
        .await?;
    Ok(Json(PostDto::summary(result)))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post and its comments deleted", body = MessageDto),
        (status = 401, description = "Unauthorized or not the author", body = ErrorBody),
        (status = 404, description = "Post not found", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    PathParam(id): PathParam<i64>,
) -> AppResult<Json<MessageDto>> {
    state.blog_service.delete_post(auth.user_id, id).await?;
    Ok(Json(MessageDto {
        message: "Post removed",
    }))
}

#[cfg(test)]
mod tests {
    use super::{UpdatePostDto, parse_category};
    use crate::domain::post::{Category, UpdatePostRequest};

    #[test]
    fn update_dto_tells_null_from_absent() {
        let dto: UpdatePostDto =
            serde_json::from_str(r#"{"excerpt":null,"title":"New"}"#).expect("must parse");
        assert_eq!(dto.excerpt, Some(None));
        assert!(dto.cover_image_url.is_none());
        assert_eq!(dto.title.as_deref(), Some("New"));
    }

    #[test]
    fn update_dto_rejects_unknown_fields() {
        let result = serde_json::from_str::<UpdatePostDto>(r#"{"author_id":2}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_dto_accepts_camel_case_cover() {
        let dto: UpdatePostDto =
            serde_json::from_str(r#"{"coverImageUrl":"https://img.test/a.png"}"#)
                .expect("must parse");
        assert_eq!(
            dto.cover_image_url,
            Some(Some("https://img.test/a.png".to_string()))
        );
    }

    #[test]
    fn update_dto_maps_category_clearing() {
        let dto: UpdatePostDto =
            serde_json::from_str(r#"{"category":null}"#).expect("must parse");
        let req = UpdatePostRequest::try_from(dto).expect("must convert");
        assert_eq!(req.category, Some(None));
    }

    #[test]
    fn blank_category_means_none_and_unknown_is_rejected() {
        assert_eq!(parse_category(Some("  ".to_string())).expect("blank"), None);
        assert_eq!(
            parse_category(Some("food".to_string())).expect("known"),
            Some(Category::Food)
        );
        assert!(parse_category(Some("Sports".to_string())).is_err());
    }
}
