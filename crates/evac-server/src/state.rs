//! Shared state for request handlers.

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::engine::Engine;

pub struct AppState {
    pub engine: Engine,
    pub default_radius_m: f64,
    /// Cancelled on shutdown; every request runs under a child of it.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(engine: Engine, config: &Config) -> Self {
        Self {
            engine,
            default_radius_m: config.default_radius_m,
            shutdown: CancellationToken::new(),
        }
    }
}
