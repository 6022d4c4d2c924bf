/**
 * Default cadence constants for the state-change watcher
 */
use std::time::Duration;

/// First backoff delay between polls when no fixed interval is given
pub const DEFAULT_MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Upper bound for the backoff delay between polls
pub const DEFAULT_MAX_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Growth factor applied to the backoff delay after every non-terminal poll
pub const BACKOFF_MULTIPLIER: u32 = 2;

/// Consecutive target observations required by default
pub const DEFAULT_CONTINUOUS_TARGET_OCCURRENCE: u32 = 1;

/// Consecutive not-found observations tolerated by default
pub const DEFAULT_NOT_FOUND_CHECKS: u32 = 0;

/// Stand-in deadline for budgets too large for the clock (30 years)
pub const UNBOUNDED_TIMEOUT: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Validate configuration constants at compile time
const _: () = {
    assert!(DEFAULT_MIN_POLL_INTERVAL.as_nanos() > 0, "DEFAULT_MIN_POLL_INTERVAL must be greater than 0");
    assert!(
        DEFAULT_MAX_POLL_INTERVAL.as_nanos() >= DEFAULT_MIN_POLL_INTERVAL.as_nanos(),
        "DEFAULT_MAX_POLL_INTERVAL must not be below DEFAULT_MIN_POLL_INTERVAL"
    );
    assert!(
        UNBOUNDED_TIMEOUT.as_secs() > DEFAULT_MAX_POLL_INTERVAL.as_secs(),
        "UNBOUNDED_TIMEOUT must exceed DEFAULT_MAX_POLL_INTERVAL"
    );
    assert!(BACKOFF_MULTIPLIER > 1, "BACKOFF_MULTIPLIER must be greater than 1");
    assert!(
        DEFAULT_CONTINUOUS_TARGET_OCCURRENCE > 0,
        "DEFAULT_CONTINUOUS_TARGET_OCCURRENCE must be greater than 0"
    );
};
