//! Time utilities

use std::time::Instant;

use chrono::Utc;

/// Get current Unix timestamp in seconds
pub fn unix_secs() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or(0)
}

/// Server start time for uptime tracking
static SERVER_START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize server start time (call once at startup)
pub fn init_server_time() {
    SERVER_START.get_or_init(Instant::now);
}

/// Get server uptime in seconds
pub fn uptime_secs() -> u64 {
    SERVER_START
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}

/// Whether a session last touched at `last_interaction` has gone stale
pub fn is_expired(last_interaction: u64, now: u64, idle_timeout_secs: u64) -> bool {
    now.saturating_sub(last_interaction) > idle_timeout_secs
}
