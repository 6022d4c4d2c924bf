/**
 * Kubernetes wait operations
 *
 * One function per condition. Each builds a fresh `WatchSpec` around an
 * `ApiStatus` refresh and takes its time budget explicitly; the defaults
 * live in `k8s::config`.
 */
use super::config::{APPEAR_NOT_FOUND_CHECKS, MAX_POLL_INTERVAL, MIN_POLL_INTERVAL};
use super::refresh::{ApiStatus, StatusFn};
use super::status::{
    self, NAMESPACE_ACTIVE, POD_PENDING, POD_RUNNING, POD_SUCCEEDED, PROGRESSING, READY,
    ROLLOUT_COMPLETE,
};
use crate::wait::{Cadence, Refresh, WaitError, WatchSpec};
use k8s_openapi::api::apps::v1::{Deployment, ReplicaSet};
use k8s_openapi::api::core::v1::{Namespace, Pod};
use kube::{Api, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub type WaitResult<K> = Result<Option<K>, WaitError<K>>;

/// Caller overrides for the cadence of a Kubernetes watch
#[derive(Debug, Clone, Default)]
pub struct WaitOptions {
    /// Poll at a fixed interval instead of backing off
    pub poll_interval: Option<Duration>,
    /// Suspend before the first poll
    pub delay: Option<Duration>,
    /// Consecutive target observations required
    pub occurrences: Option<u32>,
}

impl WaitOptions {
    fn apply<F: Refresh>(&self, mut spec: WatchSpec<F>) -> WatchSpec<F> {
        spec = spec.cadence(Cadence::Backoff {
            min: MIN_POLL_INTERVAL,
            max: MAX_POLL_INTERVAL,
            jitter: 0.2,
        });
        if let Some(interval) = self.poll_interval {
            spec = spec.poll_interval(interval);
        }
        if let Some(delay) = self.delay {
            spec = spec.delay(delay);
        }
        if let Some(occurrences) = self.occurrences {
            spec = spec.continuous_target_occurrence(occurrences);
        }
        spec
    }
}

/// `kind/name` label used in logs and errors
fn label<K: Resource<DynamicType = ()>>(name: &str) -> String {
    format!("{}/{name}", K::kind(&()).to_lowercase())
}

fn watch<K>(
    api: Api<K>,
    name: &str,
    status_of: StatusFn<K>,
    timeout: Duration,
) -> WatchSpec<ApiStatus<K>>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug + Send + Sync + 'static,
{
    WatchSpec::new(label::<K>(name), ApiStatus::new(api, name, status_of), timeout)
}

/// Wait for a pod to leave `Pending` and report `Running`
///
/// # Errors
///
/// Fails if the pod ends up in any other phase, the api call fails, the
/// budget is spent, or `cancel` fires
pub async fn wait_pod_running(
    api: Api<Pod>,
    name: &str,
    timeout: Duration,
    options: &WaitOptions,
    cancel: &CancellationToken,
) -> WaitResult<Pod> {
    let spec = watch(api, name, status::pod_phase, timeout)
        .pending([POD_PENDING])
        .target([POD_RUNNING])
        .not_found_checks(APPEAR_NOT_FOUND_CHECKS);
    options.apply(spec).wait(cancel).await
}

/// Wait for a pod to run to completion
///
/// # Errors
///
/// Fails if the pod fails, the api call fails, the budget is spent, or
/// `cancel` fires
pub async fn wait_pod_completed(
    api: Api<Pod>,
    name: &str,
    timeout: Duration,
    options: &WaitOptions,
    cancel: &CancellationToken,
) -> WaitResult<Pod> {
    let spec = watch(api, name, status::pod_phase, timeout)
        .pending([POD_PENDING, POD_RUNNING])
        .target([POD_SUCCEEDED])
        .not_found_checks(APPEAR_NOT_FOUND_CHECKS);
    options.apply(spec).wait(cancel).await
}

/// Wait for a namespace to become `Active`
///
/// # Errors
///
/// Fails on any other phase, api failure, timeout, or cancellation
pub async fn wait_namespace_active(
    api: Api<Namespace>,
    name: &str,
    timeout: Duration,
    options: &WaitOptions,
    cancel: &CancellationToken,
) -> WaitResult<Namespace> {
    let spec = watch(api, name, status::namespace_phase, timeout)
        .target([NAMESPACE_ACTIVE])
        .not_found_checks(APPEAR_NOT_FOUND_CHECKS);
    options.apply(spec).wait(cancel).await
}

/// Wait until every desired replica of a replica set is ready
///
/// # Errors
///
/// Fails if the replica set is deleted, the api call fails, the budget is
/// spent, or `cancel` fires
pub async fn wait_replicaset_ready(
    api: Api<ReplicaSet>,
    name: &str,
    timeout: Duration,
    options: &WaitOptions,
    cancel: &CancellationToken,
) -> WaitResult<ReplicaSet> {
    let spec = watch(api, name, status::replicaset_readiness, timeout)
        .pending([PROGRESSING])
        .target([READY])
        .not_found_checks(APPEAR_NOT_FOUND_CHECKS);
    options.apply(spec).wait(cancel).await
}

/// Wait for the latest deployment rollout to complete
///
/// # Errors
///
/// Fails when the rollout exceeds its progress deadline, the deployment is
/// deleted, the api call fails, the budget is spent, or `cancel` fires
pub async fn wait_deployment_rollout(
    api: Api<Deployment>,
    name: &str,
    timeout: Duration,
    options: &WaitOptions,
    cancel: &CancellationToken,
) -> WaitResult<Deployment> {
    let spec = watch(api, name, status::deployment_rollout, timeout)
        .pending([PROGRESSING])
        .target([ROLLOUT_COMPLETE])
        .not_found_checks(APPEAR_NOT_FOUND_CHECKS);
    options.apply(spec).wait(cancel).await
}

/// Wait for an object to disappear.
///
/// `live` lists every status the object may report on its way out; anything
/// else fails the watch.
///
/// # Errors
///
/// Fails on an unlisted status, api failure, timeout, or cancellation
pub async fn wait_deleted<K>(
    api: Api<K>,
    name: &str,
    status_of: StatusFn<K>,
    live: &[&str],
    timeout: Duration,
    options: &WaitOptions,
    cancel: &CancellationToken,
) -> Result<(), WaitError<K>>
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug + Send + Sync + 'static,
{
    let spec = watch(api, name, status_of, timeout)
        .pending(live.iter().copied())
        .target([crate::wait::Status::NotFound]);
    options.apply(spec).wait(cancel).await.map(|_| ())
}
