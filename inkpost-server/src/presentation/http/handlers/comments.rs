use axum::{
    Json,
    extract::State,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{AuthorDto, MessageDto};
use crate::domain::comment::{CommentNode, CommentWithAuthor, CreateCommentRequest};
use crate::presentation::AppState;
use crate::presentation::http::app_error::{AppResult, ErrorBody};
use crate::presentation::http::json::JsonBody;
use crate::presentation::http::path::PathParam;
use crate::presentation::http::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreateCommentDto {
    #[validate(length(min = 1, max = 2000))]
    pub(crate) content: String,
    #[serde(alias = "postId")]
    #[validate(range(min = 1))]
    pub(crate) post_id: i64,
    #[serde(default, alias = "parentId")]
    #[validate(range(min = 1))]
    pub(crate) parent_id: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentDto {
    pub(crate) id: i64,
    pub(crate) content: String,
    pub(crate) post_id: i64,
    pub(crate) parent_id: Option<i64>,
    pub(crate) author_id: i64,
    pub(crate) author: AuthorDto,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentNodeDto {
    #[serde(flatten)]
    pub(crate) comment: CommentDto,
    pub(crate) replies: Vec<CommentDto>,
}

impl From<CommentWithAuthor> for CommentDto {
    fn from(entry: CommentWithAuthor) -> Self {
        let CommentWithAuthor { comment, author } = entry;
        Self {
            id: comment.id,
            content: comment.content,
            post_id: comment.post_id,
            parent_id: comment.parent_id,
            author_id: comment.author_id,
            author: AuthorDto::commenter(author),
            created_at: comment.created_at,
        }
    }
}

impl From<CommentNode> for CommentNodeDto {
    fn from(node: CommentNode) -> Self {
        Self {
            comment: node.comment.into(),
            replies: node.replies.into_iter().map(CommentDto::from).collect(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/comments/post/{post_id}",
    tag = "comments",
    params(
        ("post_id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Top-level comments in order, each with its replies", body = Vec<CommentNodeDto>),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn list_comments(
    State(state): State<AppState>,
    PathParam(post_id): PathParam<i64>,
) -> AppResult<Json<Vec<CommentNodeDto>>> {
    let thread = state.comment_service.list_thread(post_id).await?;
    Ok(Json(thread.into_iter().map(CommentNodeDto::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/comments",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreateCommentDto,
    responses(
        (status = 200, description = "Comment created", body = CommentDto),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 404, description = "Post or parent comment not found", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn create_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    JsonBody(dto): JsonBody<CreateCommentDto>,
) -> AppResult<Json<CommentDto>> {
    dto.validate()?;
    let req = CreateCommentRequest {
        content: dto.content,
        post_id: dto.post_id,
        parent_id: dto.parent_id,
    };

    let created = state
        .comment_service
        .create_comment(auth.user_id, req)
        .await?;
    Ok(Json(created.into()))
}

#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Comment deleted, replies kept at top level", body = MessageDto),
        (status = 401, description = "Unauthorized or not the author", body = ErrorBody),
        (status = 404, description = "Comment not found", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    PathParam(id): PathParam<i64>,
) -> AppResult<Json<MessageDto>> {
    state
        .comment_service
        .delete_comment(auth.user_id, id)
        .await?;
    Ok(Json(MessageDto {
        message: "Comment removed",
    }))
}
