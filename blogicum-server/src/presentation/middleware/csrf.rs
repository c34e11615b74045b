use axum::{
    extract::{Request, State},
    http::{Method, header},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::infrastructure::templates::Page;
use crate::presentation::AppState;
use crate::presentation::handlers::pages::render_page;

fn is_safe(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

/// Only explicitly listed origins are trusted. A `*` entry opens CORS but
/// never vouches for a write.
fn is_trusted(trusted: &[String], origin: &str) -> bool {
    trusted
        .iter()
        .filter(|allowed| allowed.as_str() != "*")
        .any(|allowed| allowed.eq_ignore_ascii_case(origin))
}

/// Rejects state-changing requests sent from a browser page on an
/// untrusted origin. Requests without an `Origin` header pass.
pub(crate) async fn csrf_guard(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if !is_safe(request.method()) {
        let origin = request
            .headers()
            .get(header::ORIGIN)
            .map(|value| value.to_str().unwrap_or_default());
        match origin {
            Some(origin) if !is_trusted(&state.trusted_origins, origin) => {
                warn!(
                    origin,
                    method = %request.method(),
                    path = %request.uri().path(),
                    "cross-origin request rejected"
                );
                return render_page(&state.pages, Page::CsrfFailure);
            }
            _ => {}
        }
    }
    next.run(request).await
}
