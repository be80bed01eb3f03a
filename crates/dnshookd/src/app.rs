use axum::{
    Router, middleware,
    routing::get,
};

use crate::app_state::AppState;
use crate::auth::require_txt_auth;
use crate::routes::{dyndns, txt};
use crate::trace::with_trace_layer;

/// TXT record routes, each guarded by Basic authentication
fn create_txt_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/txt/{hostname}",
            get(txt::list)
                .post(txt::replace)
                .put(txt::converge)
                .delete(txt::clear),
        )
        .route_layer(middleware::from_fn_with_state(state, require_txt_auth))
}

/// Create the app
pub fn create_app(state: AppState) -> Router {
    let app = Router::new()
        .merge(create_txt_router(state.clone()))
        .route("/nic/update", get(dyndns::update))
        .with_state(state);

    with_trace_layer(app)
}
