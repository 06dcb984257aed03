//! Application state shared across routes

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::Config;
use crate::game::{Engine, GridMap};
use crate::util::rate_limit::{create_limiter, Limiter};

/// Request counters reported by the health endpoint
#[derive(Debug, Default)]
pub struct ServerStats {
    games_started: AtomicU64,
    turns_served: AtomicU64,
}

impl ServerStats {
    pub fn record_game(&self) {
        self.games_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_turn(&self) {
        self.turns_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn games_started(&self) -> u64 {
        self.games_started.load(Ordering::Relaxed)
    }

    pub fn turns_served(&self) -> u64 {
        self.turns_served.load(Ordering::Relaxed)
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub engine: Arc<Engine>,
    pub action_limiter: Arc<Limiter>,
    pub stats: Arc<ServerStats>,
}

impl AppState {
    pub fn new(config: Config, map: GridMap) -> Self {
        let engine = Engine::new(map, config.tuning, config.view);
        let action_limiter = create_limiter(config.action_rate_limit);

        Self {
            config: Arc::new(config),
            engine: Arc::new(engine),
            action_limiter,
            stats: Arc::new(ServerStats::default()),
        }
    }
}
