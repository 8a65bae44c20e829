use std::sync::Arc;
use std::time::Instant;

use crate::config::Settings;
use crate::store::TemplateStore;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub store: Arc<dyn TemplateStore>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(settings: Settings, store: Arc<dyn TemplateStore>) -> Self {
        Self {
            settings: Arc::new(settings),
            store,
            start_time: Instant::now(),
        }
    }
}
