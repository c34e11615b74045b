use axum::Router;
use axum::middleware;
use axum::routing::get;

use crate::presentation::AppState;
use crate::presentation::handlers::catalog::{category_posts, location_posts};
use crate::presentation::middleware::auth::optional_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/categories/{slug}/posts", get(category_posts))
        .route("/api/locations/{id}/posts", get(location_posts))
        .layer(middleware::from_fn_with_state(state, optional_auth_middleware))
}
