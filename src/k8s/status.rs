/**
 * Status extraction for Kubernetes kinds
 *
 * Each function maps an object to the lifecycle label the watcher classifies.
 * Pods and namespaces report their own phase; replica sets and deployments
 * are summarized the way `kubectl rollout status` does.
 */
use crate::wait::Status;
use k8s_openapi::api::apps::v1::{Deployment, ReplicaSet};
use k8s_openapi::api::core::v1::{Namespace, Pod};

pub const POD_PENDING: &str = "Pending";
pub const POD_RUNNING: &str = "Running";
pub const POD_SUCCEEDED: &str = "Succeeded";
pub const POD_FAILED: &str = "Failed";
pub const POD_UNKNOWN: &str = "Unknown";

/// Reported for any object carrying a deletion timestamp
pub const TERMINATING: &str = "Terminating";

pub const NAMESPACE_ACTIVE: &str = "Active";

pub const PROGRESSING: &str = "Progressing";
pub const READY: &str = "Ready";
pub const ROLLOUT_COMPLETE: &str = "Complete";
pub const ROLLOUT_FAILED: &str = "Failed";

const PROGRESS_DEADLINE_EXCEEDED: &str = "ProgressDeadlineExceeded";

/// Every status a live pod can report
pub const POD_LIVE_STATUSES: [&str; 6] = [
    POD_PENDING,
    POD_RUNNING,
    POD_SUCCEEDED,
    POD_FAILED,
    POD_UNKNOWN,
    TERMINATING,
];

pub const NAMESPACE_LIVE_STATUSES: [&str; 2] = [NAMESPACE_ACTIVE, TERMINATING];

pub const REPLICASET_LIVE_STATUSES: [&str; 3] = [READY, PROGRESSING, TERMINATING];

pub const DEPLOYMENT_LIVE_STATUSES: [&str; 4] =
    [ROLLOUT_COMPLETE, PROGRESSING, ROLLOUT_FAILED, TERMINATING];

#[must_use]
pub fn pod_phase(pod: &Pod) -> Status {
    if pod.metadata.deletion_timestamp.is_some() {
        return Status::new(TERMINATING);
    }
    let phase = pod
        .status
        .as_ref()
        .and_then(|status| status.phase.clone())
        .unwrap_or_else(|| POD_UNKNOWN.to_string());
    Status::new(phase)
}

#[must_use]
pub fn namespace_phase(namespace: &Namespace) -> Status {
    let phase = namespace
        .status
        .as_ref()
        .and_then(|status| status.phase.clone())
        .unwrap_or_else(|| NAMESPACE_ACTIVE.to_string());
    Status::new(phase)
}

/// `Ready` once the controller has seen the latest spec and enough pods are ready
#[must_use]
pub fn replicaset_readiness(rs: &ReplicaSet) -> Status {
    if rs.metadata.deletion_timestamp.is_some() {
        return Status::new(TERMINATING);
    }
    let desired = rs
        .spec
        .as_ref()
        .and_then(|spec| spec.replicas)
        .unwrap_or(1);
    let Some(status) = rs.status.as_ref() else {
        return Status::new(PROGRESSING);
    };

    let generation = rs.metadata.generation.unwrap_or(0);
    let observed = status.observed_generation.unwrap_or(0);
    let ready = status.ready_replicas.unwrap_or(0);

    if observed >= generation && ready >= desired && status.replicas == desired {
        Status::new(READY)
    } else {
        Status::new(PROGRESSING)
    }
}

/// Rollout state with the same rules as `kubectl rollout status`
#[must_use]
pub fn deployment_rollout(deployment: &Deployment) -> Status {
    if deployment.metadata.deletion_timestamp.is_some() {
        return Status::new(TERMINATING);
    }
    let Some(status) = deployment.status.as_ref() else {
        return Status::new(PROGRESSING);
    };

    let generation = deployment.metadata.generation.unwrap_or(0);
    if status.observed_generation.unwrap_or(0) < generation {
        return Status::new(PROGRESSING);
    }

    let deadline_exceeded = status.conditions.iter().flatten().any(|condition| {
        condition.type_ == PROGRESSING
            && condition.reason.as_deref() == Some(PROGRESS_DEADLINE_EXCEEDED)
    });
    if deadline_exceeded {
        return Status::new(ROLLOUT_FAILED);
    }

    let desired = deployment
        .spec
        .as_ref()
        .and_then(|spec| spec.replicas)
        .unwrap_or(1);
    let replicas = status.replicas.unwrap_or(0);
    let updated = status.updated_replicas.unwrap_or(0);
    let available = status.available_replicas.unwrap_or(0);

    // New replicas not yet created, old replicas not yet gone, or new ones not available
    if updated < desired || replicas > updated || available < updated {
        return Status::new(PROGRESSING);
    }
    Status::new(ROLLOUT_COMPLETE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::serde_json::{self, json};

    fn pod(mut value: serde_json::Value) -> Pod {
        value["apiVersion"] = json!("v1");
        value["kind"] = json!("Pod");
        serde_json::from_value(value).unwrap()
    }

    fn deployment(mut value: serde_json::Value) -> Deployment {
        value["apiVersion"] = json!("apps/v1");
        value["kind"] = json!("Deployment");
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_pod_phase() {
        let running = pod(json!({
            "metadata": { "name": "api-0" },
            "status": { "phase": "Running" }
        }));
        assert_eq!(pod_phase(&running), Status::new(POD_RUNNING));

        let fresh = pod(json!({ "metadata": { "name": "api-1" } }));
        assert_eq!(pod_phase(&fresh), Status::new(POD_UNKNOWN));
    }

    #[test]
    fn test_pod_terminating_wins_over_phase() {
        let deleting = pod(json!({
            "metadata": { "name": "api-0", "deletionTimestamp": "2024-05-01T10:00:00Z" },
            "status": { "phase": "Running" }
        }));
        assert_eq!(pod_phase(&deleting), Status::new(TERMINATING));
    }

    #[test]
    fn test_namespace_phase() {
        let ns: Namespace = serde_json::from_value(json!({
            "apiVersion": "v1",
            "kind": "Namespace",
            "metadata": { "name": "dev" },
            "status": { "phase": "Terminating" }
        }))
        .unwrap();
        assert_eq!(namespace_phase(&ns), Status::new(TERMINATING));
    }

    #[test]
    fn test_replicaset_readiness() {
        let progressing: ReplicaSet = serde_json::from_value(json!({
            "apiVersion": "apps/v1",
            "kind": "ReplicaSet",
            "metadata": { "name": "web-7f9c", "generation": 2 },
            "spec": { "replicas": 3, "selector": {} },
            "status": { "replicas": 3, "readyReplicas": 1, "observedGeneration": 2 }
        }))
        .unwrap();
        assert_eq!(replicaset_readiness(&progressing), Status::new(PROGRESSING));

        let ready: ReplicaSet = serde_json::from_value(json!({
            "apiVersion": "apps/v1",
            "kind": "ReplicaSet",
            "metadata": { "name": "web-7f9c", "generation": 2 },
            "spec": { "replicas": 3, "selector": {} },
            "status": { "replicas": 3, "readyReplicas": 3, "observedGeneration": 2 }
        }))
        .unwrap();
        assert_eq!(replicaset_readiness(&ready), Status::new(READY));

        let stale: ReplicaSet = serde_json::from_value(json!({
            "apiVersion": "apps/v1",
            "kind": "ReplicaSet",
            "metadata": { "name": "web-7f9c", "generation": 3 },
            "spec": { "replicas": 3, "selector": {} },
            "status": { "replicas": 3, "readyReplicas": 3, "observedGeneration": 2 }
        }))
        .unwrap();
        assert_eq!(replicaset_readiness(&stale), Status::new(PROGRESSING));
    }

    #[test]
    fn test_deployment_rollout_states() {
        let unobserved = deployment(json!({
            "metadata": { "name": "web", "generation": 4 },
            "spec": { "replicas": 2, "selector": {}, "template": {} },
            "status": { "observedGeneration": 3, "replicas": 2, "updatedReplicas": 2, "availableReplicas": 2 }
        }));
        assert_eq!(deployment_rollout(&unobserved), Status::new(PROGRESSING));

        let old_pods_remaining = deployment(json!({
            "metadata": { "name": "web", "generation": 4 },
            "spec": { "replicas": 2, "selector": {}, "template": {} },
            "status": { "observedGeneration": 4, "replicas": 3, "updatedReplicas": 2, "availableReplicas": 2 }
        }));
        assert_eq!(deployment_rollout(&old_pods_remaining), Status::new(PROGRESSING));

        let complete = deployment(json!({
            "metadata": { "name": "web", "generation": 4 },
            "spec": { "replicas": 2, "selector": {}, "template": {} },
            "status": { "observedGeneration": 4, "replicas": 2, "updatedReplicas": 2, "availableReplicas": 2 }
        }));
        assert_eq!(deployment_rollout(&complete), Status::new(ROLLOUT_COMPLETE));
    }

    #[test]
    fn test_deployment_progress_deadline() {
        let stuck = deployment(json!({
            "metadata": { "name": "web", "generation": 1 },
            "spec": { "replicas": 2, "selector": {}, "template": {} },
            "status": {
                "observedGeneration": 1,
                "replicas": 2,
                "updatedReplicas": 1,
                "availableReplicas": 0,
                "conditions": [{
                    "type": "Progressing",
                    "status": "False",
                    "reason": "ProgressDeadlineExceeded"
                }]
            }
        }));
        assert_eq!(deployment_rollout(&stuck), Status::new(ROLLOUT_FAILED));
    }
}
