use infocache::cache::CacheAccessor;
use infocache::models::{ExchangeRate, Weather};
use infocache::requestlog::RequestLog;
use infocache::store::KeyValueStore;
use infocache::users::UserService;
use std::sync::Arc;

/// Server state shared across handlers. Everything is an `Arc`, cloning
/// is cheap.
#[derive(Clone)]
pub struct AppState {
    pub weather: Arc<CacheAccessor<Weather>>,
    pub exchange: Arc<CacheAccessor<ExchangeRate>>,
    pub users: Arc<UserService>,
    pub request_log: Arc<dyn RequestLog>,
    pub store: Arc<dyn KeyValueStore>,
}
