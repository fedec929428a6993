//! Cache configuration.
//!
//! Controls how long listings and single entries stay fresh.

use std::time::Duration;

const DEFAULT_LIST_TTL_SECS: u64 = 300;
const DEFAULT_DETAIL_TTL_SECS: u64 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Freshness window for `{namespace}:list` entries.
    pub list_ttl: Duration,
    /// Freshness window for `{namespace}:single:{id}` entries.
    pub detail_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            list_ttl: Duration::from_secs(DEFAULT_LIST_TTL_SECS),
            detail_ttl: Duration::from_secs(DEFAULT_DETAIL_TTL_SECS),
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            list_ttl: settings.list_ttl,
            detail_ttl: settings.detail_ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert_eq!(config.list_ttl, Duration::from_secs(300));
        assert_eq!(config.detail_ttl, Duration::from_secs(600));
    }
}
