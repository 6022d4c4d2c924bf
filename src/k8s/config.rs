/**
 * Per-kind wait budgets and cadence for Kubernetes watches
 */
use std::time::Duration;

pub const POD_RUNNING_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const POD_COMPLETED_TIMEOUT: Duration = Duration::from_secs(30 * 60);
pub const POD_DELETE_TIMEOUT: Duration = Duration::from_secs(2 * 60);

pub const NAMESPACE_ACTIVE_TIMEOUT: Duration = Duration::from_secs(60);
pub const NAMESPACE_DELETE_TIMEOUT: Duration = Duration::from_secs(10 * 60);

pub const REPLICASET_READY_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const REPLICASET_DELETE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Matches the default `progressDeadlineSeconds` of a deployment
pub const DEPLOYMENT_ROLLOUT_TIMEOUT: Duration = Duration::from_secs(10 * 60);
pub const DEPLOYMENT_DELETE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Not-found observations tolerated while waiting for an object to appear
pub const APPEAR_NOT_FOUND_CHECKS: u32 = 3;

/// Backoff floor for api server polling
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Backoff cap for api server polling
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Validate configuration constants at compile time
const _: () = {
    assert!(POD_RUNNING_TIMEOUT.as_secs() > 0, "POD_RUNNING_TIMEOUT must be greater than 0");
    assert!(POD_COMPLETED_TIMEOUT.as_secs() > 0, "POD_COMPLETED_TIMEOUT must be greater than 0");
    assert!(POD_DELETE_TIMEOUT.as_secs() > 0, "POD_DELETE_TIMEOUT must be greater than 0");
    assert!(NAMESPACE_ACTIVE_TIMEOUT.as_secs() > 0, "NAMESPACE_ACTIVE_TIMEOUT must be greater than 0");
    assert!(NAMESPACE_DELETE_TIMEOUT.as_secs() > 0, "NAMESPACE_DELETE_TIMEOUT must be greater than 0");
    assert!(REPLICASET_READY_TIMEOUT.as_secs() > 0, "REPLICASET_READY_TIMEOUT must be greater than 0");
    assert!(REPLICASET_DELETE_TIMEOUT.as_secs() > 0, "REPLICASET_DELETE_TIMEOUT must be greater than 0");
    assert!(DEPLOYMENT_ROLLOUT_TIMEOUT.as_secs() > 0, "DEPLOYMENT_ROLLOUT_TIMEOUT must be greater than 0");
    assert!(DEPLOYMENT_DELETE_TIMEOUT.as_secs() > 0, "DEPLOYMENT_DELETE_TIMEOUT must be greater than 0");
    assert!(
        MAX_POLL_INTERVAL.as_millis() >= MIN_POLL_INTERVAL.as_millis(),
        "MAX_POLL_INTERVAL must not be below MIN_POLL_INTERVAL"
    );
};
