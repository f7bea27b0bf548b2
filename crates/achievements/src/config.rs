use std::time::Duration;

/// Default award lock TTL. Comfortably longer than the three or four
/// queries an award performs, short enough that a crashed holder only delays
/// the next attempt briefly.
const DEFAULT_LOCK_TTL_SECS: u64 = 10;

/// Achievement engine configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AchievementConfig {
    /// Lifetime of an award lock lease.
    pub lock_ttl: Duration,
}

impl AchievementConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default |
    /// |-----------------------|---------|
    /// | `BADGE_LOCK_TTL_SECS` | `10`    |
    ///
    /// Zero or unparsable values fall back to the default.
    pub fn from_env() -> Self {
        let lock_ttl_secs = std::env::var("BADGE_LOCK_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_LOCK_TTL_SECS);

        Self {
            lock_ttl: Duration::from_secs(lock_ttl_secs),
        }
    }
}

impl Default for AchievementConfig {
    fn default() -> Self {
        Self {
            lock_ttl: Duration::from_secs(DEFAULT_LOCK_TTL_SECS),
        }
    }
}
