use axum::Router;
use axum::middleware;
use axum::routing::{delete, get};

use crate::presentation::AppState;
use crate::presentation::handlers::admin::{
    create_category, create_location, delete_category, delete_location, delete_user,
    get_category, get_location, list_categories, list_comments, list_locations, list_posts,
    update_category, update_location,
};
use crate::presentation::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
        .route("/locations", get(list_locations).post(create_location))
        .route(
            "/locations/{id}",
            get(get_location)
                .put(update_location)
                .delete(delete_location),
        )
        .route("/posts", get(list_posts))
        .route("/comments", get(list_comments))
        .route("/users/{id}", delete(delete_user))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}
