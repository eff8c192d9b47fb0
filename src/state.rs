use std::sync::Arc;

use crate::config::Config;
use crate::pipeline::parse::FormatParser;
use crate::store::MemoryStore;
use crate::sync::Syncer;
use crate::types::athlete::AthleteSettings;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<MemoryStore>,
    pub syncer: Syncer,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        let syncer = Syncer::new(
            store.clone(),
            Arc::new(FormatParser),
            AthleteSettings::with_weight(config.rider_weight_kg),
            config.host_id.clone(),
        );

        Self {
            config: Arc::new(config),
            store,
            syncer,
        }
    }
}
