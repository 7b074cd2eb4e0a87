use std::sync::Arc;

use crate::{cache::ViewCache, config::AppConfig, refresh::RefreshControl, store::OrderStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub orders: Arc<dyn OrderStore>,
    pub views: Arc<ViewCache>,
    pub refresh: RefreshControl,
}

impl AppState {
    pub fn new(config: AppConfig, orders: Arc<dyn OrderStore>) -> Self {
        let views = Arc::new(ViewCache::new(config.refresh_interval()));
        let refresh = RefreshControl::new(config.refresh_interval());
        Self {
            config: Arc::new(config),
            orders,
            views,
            refresh,
        }
    }
}
