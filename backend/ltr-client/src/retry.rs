/// Retry policy with exponential backoff and jitter
use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt
    pub max_retries: u32,
    /// Retry requests that hit the transport timeout
    pub retry_on_timeout: bool,
    /// Server statuses treated as transient
    pub retry_on_status: Vec<u16>,
    /// Initial backoff duration
    pub initial_backoff: Duration,
    /// Maximum backoff duration
    pub max_backoff: Duration,
    /// Backoff multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Add random jitter to backoff (±30%)
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_on_timeout: false,
            retry_on_status: vec![502, 503, 504],
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    pub(crate) fn retries_status(&self, status: u16) -> bool {
        self.retry_on_status.contains(&status)
    }

    pub(crate) fn retries_error(&self, err: &elasticsearch::Error) -> bool {
        !err.is_timeout() || self.retry_on_timeout
    }

    /// Delay before retry number `attempt` (1-based).
    pub(crate) fn backoff(&self, attempt: u32) -> Duration {
        let exp = self
            .backoff_multiplier
            .powi(attempt.saturating_sub(1) as i32);
        let millis = (self.initial_backoff.as_millis() as f64 * exp)
            .min(self.max_backoff.as_millis() as f64);
        let base = Duration::from_millis(millis as u64);

        if self.jitter {
            let jitter_factor = 1.0 + rand::thread_rng().gen_range(-0.3..0.3);
            Duration::from_millis((base.as_millis() as f64 * jitter_factor) as u64)
        } else {
            base
        }
    }
}
