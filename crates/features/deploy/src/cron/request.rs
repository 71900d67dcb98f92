use envcfg_domain::constants::{CRON_REQUEST_DEFAULT_TIMEOUT_MS, CRON_REQUEST_PATH};
use parking_lot::RwLock;
use std::time::Duration;
use tracing::debug;

/// The self-request issued whenever the scheduler spawns a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronRequest {
    pub url: String,
    pub timeout: Duration,
    pub blocking: bool,
}

impl CronRequest {
    /// Request against `base_url` with the stock timeout.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            url: format!("{}{CRON_REQUEST_PATH}", base_url.trim_end_matches('/')),
            timeout: Duration::from_millis(CRON_REQUEST_DEFAULT_TIMEOUT_MS),
            blocking: false,
        }
    }
}

/// Holds the optional timeout override applied to every [`CronRequest`].
///
/// Setting the override is idempotent: the last value wins and there is never
/// more than one override in effect.
#[derive(Debug, Default)]
pub struct CronRequestFilter {
    timeout: RwLock<Option<Duration>>,
}

impl CronRequestFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_timeout(&self, timeout: Duration) {
        let previous = self.timeout.write().replace(timeout);
        if previous != Some(timeout) {
            debug!(timeout_ms = timeout.as_millis(), "Cron request timeout override set");
        }
    }

    pub fn clear(&self) {
        self.timeout.write().take();
    }

    #[must_use]
    pub fn timeout_override(&self) -> Option<Duration> {
        *self.timeout.read()
    }

    /// Builds the request for `base_url` with the override applied.
    #[must_use]
    pub fn resolve(&self, base_url: &str) -> CronRequest {
        let mut request = CronRequest::new(base_url);
        if let Some(timeout) = self.timeout_override() {
            request.timeout = timeout;
        }
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_request_uses_stock_timeout() {
        let request = CronRequestFilter::new().resolve("http://127.0.0.1:4583/");
        assert_eq!(request.url, "http://127.0.0.1:4583/cron");
        assert_eq!(request.timeout, Duration::from_millis(10));
        assert!(!request.blocking);
    }

    #[test]
    fn override_replaces_timeout() {
        let filter = CronRequestFilter::new();
        filter.set_timeout(Duration::from_millis(500));
        filter.set_timeout(Duration::from_millis(500));

        assert_eq!(filter.timeout_override(), Some(Duration::from_millis(500)));
        assert_eq!(filter.resolve("http://localhost").timeout, Duration::from_millis(500));

        filter.clear();
        assert_eq!(filter.timeout_override(), None);
    }
}
