use axum::Router;

use super::AppState;

pub(crate) mod admin;
pub(crate) mod auth;
pub(crate) mod catalog;
pub(crate) mod pages;
pub(crate) mod posts;
pub(crate) mod profile;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth::router())
        .nest("/api/posts", posts::router(state.clone()))
        .nest("/api/profile", profile::router(state.clone()))
        .nest("/api/admin", admin::router(state.clone()))
        .nest("/pages", pages::router())
        .merge(catalog::router(state))
}
