use clarifier::RuleClarifier;
use engine::Engine;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub clarifier: Arc<dyn RuleClarifier>,
}

impl AppState {
    pub fn new(engine: Engine, clarifier: Arc<dyn RuleClarifier>) -> Self {
        Self {
            engine: Arc::new(engine),
            clarifier,
        }
    }
}
