//! Bounded readiness wait against the triplestore health endpoint
//!
//! This is the only retry loop in the crate. Each health check is itself
//! bounded by the time left before the deadline, so an endpoint that accepts
//! the connection and never answers cannot stall the wait past its timeout.

use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use crate::drivers::TriplestoreTransport;
use crate::errors::{PublishError, Result};

/// Budget for each check once the deadline has been reached (one last attempt)
const FINAL_ATTEMPT_GRACE: Duration = Duration::from_secs(1);

/// Poll `GET /$/ping` until it answers 2xx or `wait` elapses
///
/// Returns the number of attempts it took.
pub async fn wait_until_ready<T>(
    transport: &T,
    base_url: &str,
    wait: Duration,
    interval: Duration,
) -> Result<u32>
where
    T: TriplestoreTransport + ?Sized,
{
    let started = Instant::now();
    let deadline = started + wait;
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let remaining = deadline.saturating_duration_since(Instant::now());
        let budget = if remaining.is_zero() {
            interval.min(FINAL_ATTEMPT_GRACE)
        } else {
            remaining
        };

        let detail = match timeout(budget, transport.ping()).await {
            Ok(Ok(reply)) if reply.is_success() => {
                info!(attempts, elapsed = ?started.elapsed(), "triplestore is ready");
                return Ok(attempts);
            }
            Ok(Ok(reply)) => format!("health endpoint answered status {}", reply.status),
            Ok(Err(err)) => err.to_string(),
            Err(_) => format!("health check did not answer within {:?}", budget),
        };
        debug!(attempts, detail = %detail, "triplestore not ready yet");

        let now = Instant::now();
        if now >= deadline {
            warn!(attempts, waited = ?started.elapsed(), "gave up waiting for triplestore");
            return Err(PublishError::InfrastructureUnreachable {
                base_url: base_url.to_string(),
                waited: started.elapsed(),
                detail,
            });
        }
        sleep(interval.min(deadline - now)).await;
    }
}
