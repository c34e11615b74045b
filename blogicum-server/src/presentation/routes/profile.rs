use axum::Router;
use axum::middleware;
use axum::routing::get;

use crate::presentation::AppState;
use crate::presentation::handlers::profile::{get_profile, me, update_me};
use crate::presentation::middleware::auth::{jwt_auth_middleware, optional_auth_middleware};

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/{username}", get(get_profile))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ));

    let protected = Router::new()
        .route("/", get(me).put(update_me))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware));

    public.merge(protected)
}
