/**
 * Observed resource status
 *
 * A status is an opaque lifecycle label reported by the backend. The only
 * operation the watcher performs on it is exact set membership, so it has
 * no ordering. A missing resource is the explicit `NotFound` sentinel rather
 * than an error, which lets "gone" be a target like any other status.
 */
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Status {
    /// The resource does not exist
    NotFound,
    /// Backend-reported lifecycle phase, compared by exact equality
    State(String),
}

impl Status {
    #[must_use]
    pub fn new(state: impl Into<String>) -> Self {
        Self::State(state.into())
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "<not found>"),
            Self::State(state) => write!(f, "{state}"),
        }
    }
}

impl From<&str> for Status {
    fn from(state: &str) -> Self {
        Self::new(state)
    }
}

impl From<String> for Status {
    fn from(state: String) -> Self {
        Self::State(state)
    }
}

/// Result of a single refresh: the resource snapshot (absent when not found)
/// and its classified status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation<R> {
    pub resource: Option<R>,
    pub status: Status,
}

impl<R> Observation<R> {
    pub fn found(resource: R, status: impl Into<Status>) -> Self {
        Self {
            resource: Some(resource),
            status: status.into(),
        }
    }

    #[must_use]
    pub const fn not_found() -> Self {
        Self {
            resource: None,
            status: Status::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_membership_is_exact() {
        let pending: HashSet<Status> = ["OPERATION_IN_PROGRESS".into()].into_iter().collect();

        assert!(pending.contains(&Status::new("OPERATION_IN_PROGRESS")));
        assert!(!pending.contains(&Status::new("OPERATION")));
        assert!(!pending.contains(&Status::new("operation_in_progress")));
        assert!(!pending.contains(&Status::NotFound));
    }

    #[test]
    fn test_not_found_is_distinct_from_empty_state() {
        assert_ne!(Status::NotFound, Status::new(""));
        assert!(Status::NotFound.is_not_found());
        assert!(!Status::new("").is_not_found());
        assert_eq!(Status::NotFound.to_string(), "<not found>");
    }

    #[test]
    fn test_observation_constructors() {
        let found = Observation::found(7, "RUNNING");
        assert_eq!(found.resource, Some(7));
        assert_eq!(found.status, Status::new("RUNNING"));

        let missing: Observation<u32> = Observation::not_found();
        assert!(missing.resource.is_none());
        assert!(missing.status.is_not_found());
    }
}
