use std::any::Any;

use axum::Router;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::infrastructure::templates::Page;
use crate::presentation::AppState;
use crate::presentation::app_error::UnexpectedFailure;
use crate::presentation::handlers::pages::{render_page, server_error_page};

pub(crate) fn apply_trace(router: Router) -> Router {
    router.layer(TraceLayer::new_for_http())
}

/// A panicking handler answers with the 500 page instead of dropping the
/// connection.
pub(crate) fn apply_catch_panic(router: Router, state: &AppState) -> Router {
    let pages = state.pages.clone();
    router.layer(CatchPanicLayer::custom(
        move |_: Box<dyn Any + Send + 'static>| server_error_page(&pages),
    ))
}

/// Failures a handler did not anticipate (database outages, broken disks)
/// are answered with the 500 page. The cause is already logged where the
/// error was turned into a response.
pub(crate) async fn server_error_pages(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if response.extensions().get::<UnexpectedFailure>().is_some() {
        return render_page(&state.pages, Page::ServerError);
    }
    response
}
