//! Shared application state.

use libdomain_sweep::{KeyedRateLimiters, Prober};
use std::{net::IpAddr, sync::Arc};

use crate::config::Config;

pub struct AppContext {
    pub prober: Prober,
    pub extensions: Vec<String>,
    pub max_names: usize,
    /// `None` when per-client limiting is disabled.
    pub client_limits: Option<KeyedRateLimiters<IpAddr>>,
}

impl AppContext {
    pub fn new(prober: Prober, config: &Config) -> Self {
        let rpm = config.rate_limit.requests_per_minute;
        Self {
            prober,
            extensions: config.extensions.resolve(),
            max_names: config.server.max_names,
            client_limits: (rpm > 0).then(|| KeyedRateLimiters::per_minute(rpm)),
        }
    }
}

pub type AppState = Arc<AppContext>;
