use axum::{extract::State, response::Html};
use tracing::instrument;

use crate::error::AppError;
use crate::listing::list_origin_objects;
use crate::pages;
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let objects = list_origin_objects(
        state.cache.origin(),
        state.config.origin.listing_max_pages,
    )
    .await?;
    Ok(Html(pages::listing_page(&objects)))
}
