// Application state module
// Shared, read-only state handed to every connection

use std::sync::Arc;

use super::types::Config;
use crate::logger::Logger;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Logger injected into every action handler
    pub logger: Arc<dyn Logger>,
}

impl AppState {
    pub fn new(config: Config, logger: Arc<dyn Logger>) -> Self {
        Self { config, logger }
    }
}
