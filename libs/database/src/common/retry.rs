use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Exponential backoff for establishing store connections at startup.
///
/// Repository operations themselves never retry.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Attempts after the first one
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    /// Sleep a random 50..100% of each delay so restarting replicas spread out
    pub jitter: bool,
}

impl Default for RetryConfig {
    /// 3 retries starting at 100ms, doubling up to 5s, with jitter
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retries(self, max_retries: u32) -> Self {
        Self {
            max_retries,
            ..self
        }
    }

    pub fn with_initial_delay(self, initial_delay: Duration) -> Self {
        Self {
            initial_delay,
            ..self
        }
    }

    pub fn with_max_delay(self, max_delay: Duration) -> Self {
        Self { max_delay, ..self }
    }

    pub fn without_jitter(self) -> Self {
        Self {
            jitter: false,
            ..self
        }
    }

    /// Pre-jitter delays, one per retry
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        std::iter::successors(Some(self.initial_delay.min(self.max_delay)), |previous| {
            Some(previous.mul_f64(self.multiplier).min(self.max_delay))
        })
        .take(self.max_retries as usize)
    }
}

/// Run `operation` until it succeeds or the retries in `config` run out,
/// returning the last error.
///
/// ```ignore
/// let client = retry_with_backoff(
///     || database::mongodb::connect(&url),
///     RetryConfig::new().with_max_retries(5),
/// )
/// .await?;
/// ```
pub async fn retry_with_backoff<F, Fut, T, E>(mut operation: F, config: RetryConfig) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delays = config.delays();
    let mut attempt = 1;

    loop {
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        let Some(delay) = delays.next() else {
            warn!(attempts = attempt, error = %error, "Giving up");
            return Err(error);
        };
        let delay = if config.jitter { jittered(delay) } else { delay };

        debug!(attempt, delay_ms = delay.as_millis() as u64, error = %error, "Attempt failed, retrying");
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// A pseudo-random 50..100% of `delay`
fn jittered(delay: Duration) -> Duration {
    use std::collections::hash_map::RandomState;
    use std::hash::BuildHasher;

    let percent = 50 + RandomState::new().hash_one(std::time::SystemTime::now()) % 51;
    delay.mul_f64(percent as f64 / 100.0)
}
