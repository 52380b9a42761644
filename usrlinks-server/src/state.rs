use std::fmt;
use std::sync::Arc;

use usrlinks_core::{RegistrySource, ScanEngine};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ScanEngine>,
    pub registry_source: Arc<RegistrySource>,
}

impl AppState {
    pub fn new(engine: ScanEngine, registry_source: RegistrySource) -> Self {
        Self {
            engine: Arc::new(engine),
            registry_source: Arc::new(registry_source),
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("registry_source", &self.registry_source)
            .finish_non_exhaustive()
    }
}
