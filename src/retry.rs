use std::time::Duration;

/// Bounded polling for elements that render late.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Wait before the first probe.
    pub initial_delay: Duration,
    pub max_attempts: u32,
    /// Wait between probes.
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_attempts: 5,
            interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The probe succeeded on this (1-based) attempt.
    Found { attempt: u32 },
    Exhausted { attempts: u32 },
}

impl RetryPolicy {
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Runs `probe` up to `max_attempts` times until it returns `true`.
    ///
    /// Always probes at least once.
    pub async fn wait_for(&self, mut probe: impl FnMut() -> bool) -> PollOutcome {
        tokio::time::sleep(self.initial_delay).await;
        let max_attempts = self.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            if probe() {
                return PollOutcome::Found { attempt };
            }
            tracing::debug!(attempt, max_attempts, "Probe missed");
            if attempt < max_attempts {
                tokio::time::sleep(self.interval).await;
            }
        }
        PollOutcome::Exhausted {
            attempts: max_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn found_on_first_probe_after_initial_delay() {
        let start = Instant::now();
        let outcome = RetryPolicy::default().wait_for(|| true).await;
        assert_eq!(outcome, PollOutcome::Found { attempt: 1 });
        assert_eq!(start.elapsed(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn found_after_retries() {
        let mut probes = 0;
        let start = Instant::now();
        let outcome = RetryPolicy::default()
            .wait_for(|| {
                probes += 1;
                probes == 3
            })
            .await;
        assert_eq!(outcome, PollOutcome::Found { attempt: 3 });
        assert_eq!(start.elapsed(), Duration::from_millis(2500));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_after_max_attempts_without_trailing_wait() {
        let mut probes = 0;
        let start = Instant::now();
        let outcome = RetryPolicy::default()
            .wait_for(|| {
                probes += 1;
                false
            })
            .await;
        assert_eq!(outcome, PollOutcome::Exhausted { attempts: 5 });
        assert_eq!(probes, 5);
        assert_eq!(start.elapsed(), Duration::from_millis(4500));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempts_still_probes_once() {
        let mut probes = 0;
        let outcome = RetryPolicy::default()
            .with_max_attempts(0)
            .wait_for(|| {
                probes += 1;
                false
            })
            .await;
        assert_eq!(outcome, PollOutcome::Exhausted { attempts: 1 });
        assert_eq!(probes, 1);
    }
}
