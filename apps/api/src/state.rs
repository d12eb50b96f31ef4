use std::sync::Arc;

use crate::config::Config;
use crate::extraction::DocumentExtractor;
use crate::persistence::PersistenceGateway;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn PersistenceGateway>,
    pub extractor: Arc<dyn DocumentExtractor>,
    /// Open editor sessions. In-process only; lost on restart.
    pub sessions: SessionStore,
    pub config: Config,
}
