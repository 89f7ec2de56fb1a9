use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::infrastructure::jwt::JwtService;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppError;

#[derive(Debug, Clone)]
pub(crate) struct AuthenticatedUser {
    pub(crate) user_id: i64,
    pub(crate) username: String,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::Unauthenticated)
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MaybeAuthenticated(pub(crate) Option<AuthenticatedUser>);

impl MaybeAuthenticated {
    pub(crate) fn user_id(&self) -> Option<i64> {
        self.0.as_ref().map(|user| user.user_id)
    }
}

impl FromRequestParts<AppState> for MaybeAuthenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match authenticate(&parts.headers, &state.jwt) {
            Ok(user) => Ok(Self(Some(user))),
            Err(AppError::Unauthenticated) => Ok(Self(None)),
            Err(err) => {
                debug!(error = %err, "ignoring unusable token on optional route");
                Ok(Self(None))
            }
        }
    }
}

pub(crate) async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(request.headers(), &state.jwt)?;
    debug!(user_id = user.user_id, username = %user.username, "request authenticated");
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

fn authenticate(headers: &HeaderMap, jwt: &JwtService) -> Result<AuthenticatedUser, AppError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::Unauthenticated)?
        .to_str()
        .map_err(|_| AppError::InvalidCredential)?;

    let token = bearer_token(auth_header).ok_or(AppError::InvalidCredential)?;

    let claims = jwt.verify_token(token).map_err(|err| {
        debug!(error = %err, "bearer token rejected");
        AppError::InvalidCredential
    })?;

    Ok(AuthenticatedUser {
        user_id: claims.user_id,
        username: claims.username,
    })
}

fn bearer_token(header_value: &str) -> Option<&str> {
    let mut parts = header_value.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token)
}
