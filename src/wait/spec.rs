use super::config::{
    BACKOFF_MULTIPLIER, DEFAULT_CONTINUOUS_TARGET_OCCURRENCE, DEFAULT_MAX_POLL_INTERVAL,
    DEFAULT_MIN_POLL_INTERVAL, DEFAULT_NOT_FOUND_CHECKS,
};
use super::errors::WaitError;
use super::refresh::Refresh;
use super::status::Status;
use super::tally::Rules;
use rand::Rng;
use std::collections::HashSet;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Delay schedule between polls
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cadence {
    /// Constant interval
    Fixed(Duration),
    /// Starts at `min`, doubles after every non-terminal poll, capped at `max`.
    /// `jitter` (0.0 - 1.0) shortens each delay by up to that fraction.
    Backoff {
        min: Duration,
        max: Duration,
        jitter: f64,
    },
}

impl Default for Cadence {
    fn default() -> Self {
        Self::Backoff {
            min: DEFAULT_MIN_POLL_INTERVAL,
            max: DEFAULT_MAX_POLL_INTERVAL,
            jitter: 0.0,
        }
    }
}

impl Cadence {
    #[must_use]
    pub fn schedule(self) -> PollSchedule {
        let next = match self {
            Self::Fixed(interval) => interval,
            Self::Backoff { min, .. } => min,
        };
        PollSchedule {
            cadence: self,
            next,
        }
    }
}

/// Iterator-like source of successive poll delays
#[derive(Debug, Clone)]
pub struct PollSchedule {
    cadence: Cadence,
    next: Duration,
}

impl PollSchedule {
    pub fn next_delay(&mut self) -> Duration {
        match self.cadence {
            Cadence::Fixed(interval) => interval,
            Cadence::Backoff { min, max, jitter } => {
                let max = max.max(min);
                let bound = self.next.clamp(min, max);
                self.next = bound.checked_mul(BACKOFF_MULTIPLIER).map_or(max, |d| d.min(max));

                let jitter = jitter.clamp(0.0, 1.0);
                if jitter > 0.0 {
                    let factor = rand::rng().random_range((1.0 - jitter)..=1.0);
                    bound.mul_f64(factor)
                } else {
                    bound
                }
            }
        }
    }
}

/// Configuration of a single watch.
///
/// Built fresh for every watch and consumed by [`WatchSpec::wait`]:
///
/// ```ignore
/// let service = WatchSpec::new("service/web", refresh, Duration::from_secs(1200))
///     .pending(["OPERATION_IN_PROGRESS"])
///     .target(["RUNNING"])
///     .wait(&cancel)
///     .await?;
/// ```
pub struct WatchSpec<F> {
    pub(crate) name: String,
    pub(crate) refresh: F,
    pub(crate) rules: Rules,
    pub(crate) timeout: Duration,
    pub(crate) delay: Duration,
    pub(crate) cadence: Cadence,
}

impl<F: Refresh> WatchSpec<F> {
    /// `name` identifies the watched resource in logs and errors
    pub fn new(name: impl Into<String>, refresh: F, timeout: Duration) -> Self {
        Self {
            name: name.into(),
            refresh,
            rules: Rules {
                pending: HashSet::new(),
                target: HashSet::new(),
                tolerated: HashSet::new(),
                continuous_target_occurrence: DEFAULT_CONTINUOUS_TARGET_OCCURRENCE,
                not_found_checks: DEFAULT_NOT_FOUND_CHECKS,
            },
            timeout,
            delay: Duration::ZERO,
            cadence: Cadence::default(),
        }
    }

    /// Statuses meaning the operation is still in progress
    #[must_use]
    pub fn pending<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Status>,
    {
        self.rules.pending.extend(statuses.into_iter().map(Into::into));
        self
    }

    /// Statuses meaning success. Leaving this empty waits for the resource
    /// to disappear.
    #[must_use]
    pub fn target<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Status>,
    {
        self.rules.target.extend(statuses.into_iter().map(Into::into));
        self
    }

    /// Intermediate statuses that keep the watch going without being pending
    #[must_use]
    pub fn tolerate<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Status>,
    {
        self.rules.tolerated.extend(statuses.into_iter().map(Into::into));
        self
    }

    /// Suspend before the first poll. Counts against the timeout.
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Poll at a fixed interval instead of backing off
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.cadence = Cadence::Fixed(interval);
        self
    }

    /// Raise the floor of the backoff schedule
    #[must_use]
    pub fn min_interval(mut self, floor: Duration) -> Self {
        if let Cadence::Backoff { min, max, .. } = &mut self.cadence {
            *min = floor;
            *max = (*max).max(floor);
        }
        self
    }

    #[must_use]
    pub fn cadence(mut self, cadence: Cadence) -> Self {
        self.cadence = cadence;
        self
    }

    /// Consecutive target observations required before success (at least 1)
    #[must_use]
    pub fn continuous_target_occurrence(mut self, occurrences: u32) -> Self {
        self.rules.continuous_target_occurrence = occurrences.max(1);
        self
    }

    /// Consecutive not-found observations tolerated before failing
    #[must_use]
    pub fn not_found_checks(mut self, checks: u32) -> Self {
        self.rules.not_found_checks = checks;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fill in the implicit "wait until gone" target
    pub(crate) fn resolve(mut self) -> Self {
        if self.rules.target.is_empty() {
            self.rules.target.insert(Status::NotFound);
        }
        self
    }

    /// Run the watch to completion. See [`super::wait`].
    ///
    /// # Errors
    ///
    /// Returns the [`WaitError`] that ended the watch
    pub async fn wait(
        self,
        cancel: &CancellationToken,
    ) -> Result<Option<F::Resource>, WaitError<F::Resource>> {
        super::watcher::wait(self, cancel).await
    }
}
