use std::sync::Arc;

use crate::config::Config;
use crate::store::CapacityStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Catalog and allocation storage. `PgStore` in production.
    pub store: Arc<dyn CapacityStore>,
    pub config: Config,
}
