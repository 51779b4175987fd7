pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod listing;
pub mod pages;
pub mod routes;
pub mod state;

use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    routes::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
