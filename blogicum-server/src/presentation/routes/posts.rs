use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};

use crate::presentation::AppState;
use crate::presentation::handlers::comments::{
    add_comment, delete_comment, list_comments, update_comment,
};
use crate::presentation::handlers::posts::{
    create_post, delete_image, delete_post, get_post, list_posts, update_post, upload_image,
};
use crate::presentation::middleware::auth::{jwt_auth_middleware, optional_auth_middleware};

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(list_posts))
        .route("/{id}", get(get_post))
        .route("/{id}/comments", get(list_comments))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ));

    let protected = Router::new()
        .route("/", post(create_post))
        .route("/{id}", put(update_post).delete(delete_post))
        .route("/{id}/image", put(upload_image).delete(delete_image))
        .route("/{id}/comments", post(add_comment))
        .route(
            "/{id}/comments/{comment_id}",
            put(update_comment).delete(delete_comment),
        )
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware));

    public.merge(protected)
}
