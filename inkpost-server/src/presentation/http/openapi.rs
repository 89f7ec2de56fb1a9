use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::http::app_error::{ErrorBody, FieldError};
use crate::presentation::http::handlers::auth::{
    LoginDto, LoginResponseDto, RegisterDto, TokenResponseDto, UserDto,
};
use crate::presentation::http::handlers::comments::{CommentDto, CommentNodeDto, CreateCommentDto};
use crate::presentation::http::handlers::health::HealthzResponse;
use crate::presentation::http::handlers::posts::{CreatePostDto, PostDto, UpdatePostDto};
use crate::presentation::http::handlers::{AuthorDto, MessageDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http::handlers::health::healthz,
        crate::presentation::http::handlers::auth::register,
        crate::presentation::http::handlers::auth::login,
        crate::presentation::http::handlers::posts::list_posts,
        crate::presentation::http::handlers::posts::get_post,
        crate::presentation::http::handlers::posts::create_post,
        crate::presentation::http::handlers::posts::update_post,
        crate::presentation::http::handlers::posts::delete_post,
        crate::presentation::http::handlers::comments::list_comments,
        crate::presentation::http::handlers::comments::create_comment,
        crate::presentation::http::handlers::comments::delete_comment
    ),
    components(
        schemas(
            RegisterDto,
            LoginDto,
            TokenResponseDto,
            LoginResponseDto,
            UserDto,
            AuthorDto,
            CreatePostDto,
            UpdatePostDto,
            PostDto,
            CreateCommentDto,
            CommentDto,
            CommentNodeDto,
            MessageDto,
            HealthzResponse,
            ErrorBody,
            FieldError
        )
    ),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "posts", description = "Post endpoints"),
        (name = "comments", description = "Threaded comments"),
        (name = "health", description = "Liveness probe")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}
