use std::sync::Arc;

use crate::application::ports::JobStore;

#[derive(Clone)]
pub struct AppState {
    pub job_store: Arc<dyn JobStore>,
    pub default_max_attempts: i32,
}
