use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};

use crate::presentation::AppState;
use crate::presentation::http::handlers::posts::{
    create_post, delete_post, get_post, list_posts, update_post,
};
use crate::presentation::http::middleware::auth::jwt_auth_middleware;

// GET принимает slug, PUT и DELETE принимают id в том же сегменте пути
const ONE_POST: &str = "/{post}";

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(list_posts))
        .route(ONE_POST, get(get_post));

    let protected = Router::new()
        .route("/", post(create_post))
        .route(ONE_POST, put(update_post).delete(delete_post))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware));

    public.merge(protected)
}
