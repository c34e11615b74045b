use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::error;

use crate::infrastructure::templates::{Page, PageRenderer};
use crate::presentation::AppState;

pub(crate) fn render_page(pages: &PageRenderer, page: Page) -> Response {
    match pages.render(page) {
        Ok(html) => (page.status(), Html(html)).into_response(),
        Err(err) => {
            error!(error = %err, template = page.template(), "failed to render page");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
        }
    }
}

pub(crate) fn server_error_page(pages: &PageRenderer) -> Response {
    error!("handler panicked");
    render_page(pages, Page::ServerError)
}

pub(crate) async fn about(State(state): State<AppState>) -> Response {
    render_page(&state.pages, Page::About)
}

pub(crate) async fn rules(State(state): State<AppState>) -> Response {
    render_page(&state.pages, Page::Rules)
}

pub(crate) async fn not_found(State(state): State<AppState>) -> Response {
    render_page(&state.pages, Page::NotFound)
}
