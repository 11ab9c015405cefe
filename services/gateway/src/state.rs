use matching_engine::Exchange;
use persistence::MemoryStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub exchange: Arc<Exchange<MemoryStore>>,
}

impl AppState {
    pub fn new(exchange: Arc<Exchange<MemoryStore>>) -> Self {
        Self { exchange }
    }
}
