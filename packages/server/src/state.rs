use std::sync::Arc;

use vod_cache::VideoCache;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub cache: Arc<VideoCache>,
}
