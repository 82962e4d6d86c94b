//! Polling with exponential backoff.
//!
//! Used for S3 Control operations that complete asynchronously, where the
//! delete call only returns a request token to poll.

use anyhow::Result;
use backon::{BackoffBuilder, ExponentialBuilder};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for polling with exponential backoff.
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// Initial delay between checks
    pub initial_delay: Duration,
    /// Cap for exponential growth
    pub max_delay: Duration,
    /// Maximum total time to wait
    pub timeout: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            timeout: Duration::from_secs(60),
        }
    }
}

impl WaitConfig {
    /// Multi-Region Access Point operations routinely take several minutes.
    pub fn multi_region_access_point() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(30),
            timeout: Duration::from_secs(15 * 60),
        }
    }
}

/// Poll `check` until it returns `Ok(true)`.
///
/// `Ok(false)` schedules another check after the next backoff delay. An
/// error from `check` ends the wait immediately. Exceeding
/// `config.timeout` fails with a message naming `what`.
pub async fn wait_until<F, Fut>(config: WaitConfig, check: F, what: &str) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let start = tokio::time::Instant::now();
    let mut attempts = 0u32;

    let mut delays = ExponentialBuilder::default()
        .with_min_delay(config.initial_delay)
        .with_max_delay(config.max_delay)
        .with_factor(2.0)
        .with_jitter()
        .build();

    loop {
        attempts += 1;

        if start.elapsed() >= config.timeout {
            anyhow::bail!(
                "Timeout waiting for {} after {:?} ({} attempts)",
                what,
                config.timeout,
                attempts - 1
            );
        }

        match check().await {
            Ok(true) => {
                debug!(what = %what, attempts, "Wait complete");
                return Ok(());
            }
            Ok(false) => {
                let delay = delays.next().unwrap_or(config.max_delay);
                debug!(
                    what = %what,
                    attempt = attempts,
                    delay_ms = delay.as_millis(),
                    "Not ready, polling again"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                warn!(what = %what, error = ?e, "Wait check failed");
                return Err(e);
            }
        }
    }
}
