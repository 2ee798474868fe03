use time::Duration;

use crate::error::Error;

/// Limits shared by the session manager, rate limiter and audit log.
///
/// Defaults match the desktop shell: 30 minute sessions swept every
/// minute, 10 submissions per minute per session.
///
/// ```rust,ignore
/// use ceac_autofill::SecurityConfig;
///
/// let config = SecurityConfig::default()
///     .with_rate_limit(5, time::Duration::seconds(30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct SecurityConfig {
    pub session_max_age: Duration,
    pub cleanup_interval: Duration,
    pub rate_limit_max_attempts: u32,
    pub rate_limit_window: Duration,
    /// Upper bound on keys the rate limiter tracks at once.
    pub rate_limit_max_keys: usize,
    /// Upper bound on retained audit records; oldest are evicted first.
    pub audit_capacity: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            session_max_age: Duration::minutes(30),
            cleanup_interval: Duration::seconds(60),
            rate_limit_max_attempts: 10,
            rate_limit_window: Duration::seconds(60),
            rate_limit_max_keys: 1024,
            audit_capacity: 10_000,
        }
    }
}

impl SecurityConfig {
    /// Build from environment variables, falling back to defaults.
    ///
    /// # Optional env vars
    /// - `CEAC_SESSION_MAX_AGE_SECS`
    /// - `CEAC_SESSION_CLEANUP_SECS`
    /// - `CEAC_RATE_LIMIT_MAX_ATTEMPTS`
    /// - `CEAC_RATE_LIMIT_WINDOW_SECS`
    /// - `CEAC_AUDIT_CAPACITY`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a variable is set but not a positive integer.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::default();

        if let Some(secs) = env_number("CEAC_SESSION_MAX_AGE_SECS")? {
            config = config.with_session_max_age(Duration::seconds(secs));
        }
        if let Some(secs) = env_number("CEAC_SESSION_CLEANUP_SECS")? {
            config = config.with_cleanup_interval(Duration::seconds(secs));
        }
        let attempts = env_number("CEAC_RATE_LIMIT_MAX_ATTEMPTS")?;
        let window = env_number("CEAC_RATE_LIMIT_WINDOW_SECS")?;
        if attempts.is_some() || window.is_some() {
            let attempts = match attempts {
                Some(n) => u32::try_from(n).map_err(|_| {
                    Error::Config("CEAC_RATE_LIMIT_MAX_ATTEMPTS is out of range".into())
                })?,
                None => config.rate_limit_max_attempts,
            };
            let window = window.map_or(config.rate_limit_window, Duration::seconds);
            config = config.with_rate_limit(attempts, window);
        }
        if let Some(capacity) = env_number("CEAC_AUDIT_CAPACITY")? {
            let capacity = usize::try_from(capacity)
                .map_err(|_| Error::Config("CEAC_AUDIT_CAPACITY is out of range".into()))?;
            config = config.with_audit_capacity(capacity);
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_session_max_age(mut self, max_age: Duration) -> Self {
        self.session_max_age = max_age;
        self
    }

    #[must_use]
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    #[must_use]
    pub fn with_rate_limit(mut self, max_attempts: u32, window: Duration) -> Self {
        self.rate_limit_max_attempts = max_attempts;
        self.rate_limit_window = window;
        self
    }

    #[must_use]
    pub fn with_rate_limit_max_keys(mut self, max_keys: usize) -> Self {
        self.rate_limit_max_keys = max_keys;
        self
    }

    #[must_use]
    pub fn with_audit_capacity(mut self, capacity: usize) -> Self {
        self.audit_capacity = capacity;
        self
    }
}

fn env_number(name: &str) -> Result<Option<i64>, Error> {
    parse_positive(name, std::env::var(name).ok().as_deref())
}

pub(crate) fn parse_positive(name: &str, raw: Option<&str>) -> Result<Option<i64>, Error> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.trim().parse::<i64>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(Error::Config(format!(
            "{name} must be a positive integer, got '{raw}'"
        ))),
    }
}
