use std::sync::Arc;

use crate::middleware::RateLimiter;
use crate::store::WellnessStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn WellnessStore>,
    pub session_key: Vec<u8>,
    pub login_limiter: RateLimiter,
}

pub type SharedState = Arc<AppState>;
