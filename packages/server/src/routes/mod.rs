use axum::{Router, routing::get};

use crate::handlers::{health, listing, stream, watch};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(listing::index))
        .route("/watch/{*name}", get(watch::watch))
        .route("/stream/{*name}", get(stream::stream))
        .route("/health", get(health::health))
}
