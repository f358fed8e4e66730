use crate::counter::CounterService;
use crate::pocketbase::PocketBase;
use crate::session::SessionRegistry;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub counter: Arc<CounterService>,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(client: PocketBase) -> Self {
        Self {
            counter: Arc::new(CounterService::new()),
            sessions: SessionRegistry::new(client),
        }
    }
}
