/**
 * State-change watcher
 *
 * Polls a refresh function until the observed status reaches the target set,
 * leaves the accepted sets, the time budget runs out, or the caller cancels.
 * One refresh is outstanding at a time and every suspension also listens to
 * the cancellation token.
 *
 * Suspensions are clipped to the remaining budget, so the last poll lands on
 * the deadline and is classified before the timeout is declared.
 */
use super::config::UNBOUNDED_TIMEOUT;
use super::errors::WaitError;
use super::refresh::Refresh;
use super::spec::WatchSpec;
use super::status::{Observation, Status};
use super::tally::{Step, Tally};
use std::time::Duration;
use tokio::time::{Instant, sleep, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Run one watch to a terminal state.
///
/// Returns the resource from the observation that satisfied the target
/// (`None` when the target was the resource being gone).
///
/// # Errors
///
/// - [`WaitError::Refresh`] as soon as a refresh call fails
/// - [`WaitError::UnexpectedStatus`] for a status outside every accepted set
/// - [`WaitError::NotFound`] when the not-found allowance is used up
/// - [`WaitError::Timeout`] once the budget, counted from the start of the
///   watch, is spent
/// - [`WaitError::Cancelled`] when `cancel` fires first
pub async fn wait<F: Refresh>(
    spec: WatchSpec<F>,
    cancel: &CancellationToken,
) -> Result<Option<F::Resource>, WaitError<F::Resource>> {
    let WatchSpec {
        name,
        refresh,
        rules,
        timeout,
        delay,
        cadence,
    } = spec.resolve();

    let started = Instant::now();
    // Durations too large for the clock mean "no practical limit"
    let deadline = started
        .checked_add(timeout)
        .unwrap_or_else(|| started + UNBOUNDED_TIMEOUT);
    let mut last_status: Option<Status> = None;
    let mut last: Option<F::Resource> = None;

    info!(
        resource = %name,
        timeout_ms = timeout.as_millis(),
        expected = %rules.expected(),
        "⏳ WAIT START: {}", name
    );

    if !delay.is_zero() {
        let delay = clip(delay, deadline);
        debug!(resource = %name, delay_ms = delay.as_millis(), "💤 Initial delay before first poll");
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return Err(cancelled(name, last_status, started, timeout));
            }
            () = sleep(delay) => {}
        }
    }

    let mut tally = Tally::default();
    let mut schedule = cadence.schedule();
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;

        let refreshed = if Instant::now() < deadline {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    return Err(cancelled(name, last_status, started, timeout));
                }
                result = refresh.refresh() => result,
                () = sleep_until(deadline) => {
                    return Err(timed_out(name, last_status, last, started, timeout));
                }
            }
        } else {
            // Poll on the deadline: bounded by the refresh itself
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    return Err(cancelled(name, last_status, started, timeout));
                }
                result = refresh.refresh() => result,
            }
        };

        let Observation { resource, status } = match refreshed {
            Ok(observation) => observation,
            Err(source) => {
                warn!(resource = %name, attempt, error = %source, "❌ REFRESH FAILED: {}", name);
                return Err(WaitError::Refresh {
                    resource: name,
                    last_status,
                    elapsed: started.elapsed(),
                    timeout,
                    source,
                });
            }
        };

        let step = tally.observe(&rules, &status);
        debug!(
            resource = %name,
            attempt,
            status = %status,
            step = ?step,
            elapsed_ms = started.elapsed().as_millis(),
            "🔄 POLL"
        );

        match step {
            Step::Reached => {
                info!(
                    resource = %name,
                    attempt,
                    status = %status,
                    elapsed_ms = started.elapsed().as_millis(),
                    "✅ WAIT DONE: {}", name
                );
                return Ok(resource);
            }
            Step::Unexpected => {
                warn!(resource = %name, attempt, status = %status, "⚠️  UNEXPECTED STATUS: {}", name);
                return Err(WaitError::UnexpectedStatus {
                    resource: name,
                    status,
                    expected: rules.expected(),
                    elapsed: started.elapsed(),
                    timeout,
                    last: resource,
                });
            }
            Step::MissingExhausted { checks } => {
                warn!(resource = %name, attempt, checks, "💀 NOT FOUND: {}", name);
                return Err(WaitError::NotFound {
                    resource: name,
                    checks,
                    elapsed: started.elapsed(),
                    timeout,
                });
            }
            Step::Confirming { .. } | Step::Pending | Step::Tolerated | Step::Missing { .. } => {
                last_status = Some(status);
                last = resource;
            }
        }

        if Instant::now() >= deadline {
            return Err(timed_out(name, last_status, last, started, timeout));
        }

        let pause = clip(schedule.next_delay(), deadline);
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return Err(cancelled(name, last_status, started, timeout));
            }
            () = sleep(pause) => {}
        }
    }
}

/// Shorten `pause` so it ends no later than `deadline`
fn clip(pause: Duration, deadline: Instant) -> Duration {
    pause.min(deadline.saturating_duration_since(Instant::now()))
}

fn cancelled<R: std::fmt::Debug>(
    name: String,
    last_status: Option<Status>,
    started: Instant,
    timeout: Duration,
) -> WaitError<R> {
    let elapsed = started.elapsed();
    info!(resource = %name, elapsed_ms = elapsed.as_millis(), "🛑 WAIT CANCELLED: {}", name);
    WaitError::Cancelled {
        resource: name,
        last_status,
        elapsed,
        timeout,
    }
}

fn timed_out<R: std::fmt::Debug>(
    name: String,
    last_status: Option<Status>,
    last: Option<R>,
    started: Instant,
    timeout: Duration,
) -> WaitError<R> {
    let elapsed = started.elapsed();
    warn!(
        resource = %name,
        elapsed_ms = elapsed.as_millis(),
        timeout_ms = timeout.as_millis(),
        "⌛ WAIT TIMEOUT: {}", name
    );
    WaitError::Timeout {
        resource: name,
        last_status,
        elapsed,
        timeout,
        last,
    }
}
