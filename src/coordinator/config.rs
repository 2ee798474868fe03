use std::time::Duration;

use url::Url;

use crate::ceac::TARGET_URL;
use crate::config::{SecurityConfig, parse_positive};
use crate::error::Error;

/// Coordinator configuration.
///
/// Use [`from_env()`](CoordinatorConfig::from_env) for convention-based setup,
/// or [`default()`](Default::default) with `with_*` methods for full control.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub(super) target_url: Url,
    /// Pause between accepting a submission and relaying it to the page.
    pub(super) settle_delay: Duration,
    pub(super) security: SecurityConfig,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            target_url: TARGET_URL.parse().expect("valid default URL"),
            settle_delay: Duration::from_secs(3),
            security: SecurityConfig::default(),
        }
    }
}

impl CoordinatorConfig {
    /// Create config from environment variables.
    ///
    /// # Optional env vars
    /// - `CEAC_TARGET_URL`: Override the page opened in the target window
    /// - `CEAC_SETTLE_DELAY_MS`: Delay before relaying a submission
    /// - everything read by [`SecurityConfig::from_env`]
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a variable is set but malformed.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::default().with_security(SecurityConfig::from_env()?);

        if let Ok(url_str) = std::env::var("CEAC_TARGET_URL") {
            let url: Url = url_str
                .parse()
                .map_err(|e| Error::Config(format!("CEAC_TARGET_URL: {e}")))?;
            config = config.with_target_url(url);
        }
        let delay = std::env::var("CEAC_SETTLE_DELAY_MS").ok();
        if let Some(ms) = parse_positive("CEAC_SETTLE_DELAY_MS", delay.as_deref())? {
            config = config.with_settle_delay(Duration::from_millis(ms.unsigned_abs()));
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_target_url(mut self, url: Url) -> Self {
        self.target_url = url;
        self
    }

    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    #[must_use]
    pub fn with_security(mut self, security: SecurityConfig) -> Self {
        self.security = security;
        self
    }

    #[must_use]
    pub fn target_url(&self) -> &Url {
        &self.target_url
    }

    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    #[must_use]
    pub fn security(&self) -> &SecurityConfig {
        &self.security
    }
}
