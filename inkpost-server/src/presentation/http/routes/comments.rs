use axum::Router;
use axum::middleware;
use axum::routing::{delete, get, post};

use crate::presentation::AppState;
use crate::presentation::http::handlers::comments::{
    create_comment, delete_comment, list_comments,
};
use crate::presentation::http::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/post/{post_id}", get(list_comments));

    let protected = Router::new()
        .route("/", post(create_comment))
        .route("/{id}", delete(delete_comment))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware));

    public.merge(protected)
}
