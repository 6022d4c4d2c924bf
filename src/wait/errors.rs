use super::status::Status;
use crate::error::Error;
use std::fmt;
use std::time::Duration;

/// Terminal failure of a watch. Every variant names the watched resource,
/// the time spent and the configured budget; variants raised mid-watch carry
/// the last observation for diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum WaitError<R: fmt::Debug> {
    /// The status lookup itself failed
    #[error(
        "refreshing {resource} failed (last status: {}, elapsed {elapsed:?}, timeout {timeout:?}): {source}",
        label(.last_status)
    )]
    Refresh {
        resource: String,
        last_status: Option<Status>,
        elapsed: Duration,
        timeout: Duration,
        #[source]
        source: Error,
    },

    /// Observed status is neither pending nor target
    #[error(
        "unexpected status {status} for {resource} (expected one of: {expected}, elapsed {elapsed:?}, timeout {timeout:?})"
    )]
    UnexpectedStatus {
        resource: String,
        status: Status,
        expected: String,
        elapsed: Duration,
        timeout: Duration,
        last: Option<R>,
    },

    /// The budget ran out while the resource was still pending
    #[error(
        "timeout while waiting for {resource} (last status: {}, elapsed {elapsed:?}, timeout {timeout:?})",
        label(.last_status)
    )]
    Timeout {
        resource: String,
        last_status: Option<Status>,
        elapsed: Duration,
        timeout: Duration,
        last: Option<R>,
    },

    /// The caller gave up before the watch resolved
    #[error(
        "wait for {resource} cancelled (last status: {}, elapsed {elapsed:?}, timeout {timeout:?})",
        label(.last_status)
    )]
    Cancelled {
        resource: String,
        last_status: Option<Status>,
        elapsed: Duration,
        timeout: Duration,
    },

    /// The resource stayed missing past the not-found allowance
    #[error(
        "{resource} not found after {checks} consecutive checks (elapsed {elapsed:?}, timeout {timeout:?})"
    )]
    NotFound {
        resource: String,
        checks: u32,
        elapsed: Duration,
        timeout: Duration,
    },
}

fn label(status: &Option<Status>) -> String {
    status
        .as_ref()
        .map_or_else(|| "none observed".to_string(), ToString::to_string)
}

impl<R: fmt::Debug> WaitError<R> {
    #[must_use]
    pub fn resource(&self) -> &str {
        match self {
            Self::Refresh { resource, .. }
            | Self::UnexpectedStatus { resource, .. }
            | Self::Timeout { resource, .. }
            | Self::Cancelled { resource, .. }
            | Self::NotFound { resource, .. } => resource,
        }
    }

    /// Last status seen before the watch ended, if any
    #[must_use]
    pub const fn last_status(&self) -> Option<&Status> {
        match self {
            Self::UnexpectedStatus { status, .. } => Some(status),
            Self::Refresh { last_status, .. }
            | Self::Timeout { last_status, .. }
            | Self::Cancelled { last_status, .. } => last_status.as_ref(),
            Self::NotFound { .. } => Some(&Status::NotFound),
        }
    }

    /// Budget the watch was configured with
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        match self {
            Self::Refresh { timeout, .. }
            | Self::UnexpectedStatus { timeout, .. }
            | Self::Timeout { timeout, .. }
            | Self::Cancelled { timeout, .. }
            | Self::NotFound { timeout, .. } => *timeout,
        }
    }

    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        match self {
            Self::Refresh { elapsed, .. }
            | Self::UnexpectedStatus { elapsed, .. }
            | Self::Timeout { elapsed, .. }
            | Self::Cancelled { elapsed, .. }
            | Self::NotFound { elapsed, .. } => *elapsed,
        }
    }

    /// Last resource snapshot attached to the failure
    #[must_use]
    pub fn into_last_resource(self) -> Option<R> {
        match self {
            Self::UnexpectedStatus { last, .. } | Self::Timeout { last, .. } => last,
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_carries_context() {
        let err: WaitError<()> = WaitError::Timeout {
            resource: "service/web".to_string(),
            last_status: Some("OPERATION_IN_PROGRESS".into()),
            elapsed: Duration::from_secs(1200),
            timeout: Duration::from_secs(1200),
            last: None,
        };
        let message = err.to_string();
        assert!(message.contains("service/web"));
        assert!(message.contains("OPERATION_IN_PROGRESS"));
        assert!(message.contains("1200s"));
        assert!(err.is_timeout());
        assert!(!err.is_cancelled());
    }

    #[test]
    fn test_cancelled_without_observation() {
        let err: WaitError<()> = WaitError::Cancelled {
            resource: "pod/api".to_string(),
            last_status: None,
            elapsed: Duration::from_millis(5),
            timeout: Duration::from_secs(30),
        };
        assert!(err.to_string().contains("none observed"));
        assert!(err.to_string().contains("timeout 30s"));
        assert_eq!(err.last_status(), None);
        assert_eq!(err.resource(), "pod/api");
    }

    #[test]
    fn test_refresh_error_keeps_source() {
        let err: WaitError<()> = WaitError::Refresh {
            resource: "ns/dev".to_string(),
            last_status: Some("PENDING".into()),
            elapsed: Duration::from_secs(4),
            timeout: Duration::from_secs(60),
            source: Error::custom("connection reset"),
        };
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("connection reset"));
        assert_eq!(err.last_status(), Some(&Status::new("PENDING")));
        assert_eq!(err.timeout(), Duration::from_secs(60));

        let message = err.to_string();
        assert!(message.contains("ns/dev"));
        assert!(message.contains("last status: PENDING"));
        assert!(message.contains("elapsed 4s"));
        assert!(message.contains("timeout 60s"));
    }

    #[test]
    fn test_not_found_reports_budget() {
        let err: WaitError<()> = WaitError::NotFound {
            resource: "pod/api-0".to_string(),
            checks: 3,
            elapsed: Duration::from_secs(2),
            timeout: Duration::from_secs(300),
        };
        assert_eq!(err.last_status(), Some(&Status::NotFound));
        assert_eq!(err.timeout(), Duration::from_secs(300));
        assert!(err.to_string().contains("3 consecutive checks"));
        assert!(err.to_string().contains("timeout 300s"));
    }

    #[test]
    fn test_unexpected_status_returns_snapshot() {
        let err = WaitError::UnexpectedStatus {
            resource: "cfg/a".to_string(),
            status: "FAILED".into(),
            expected: "ACTIVE".to_string(),
            elapsed: Duration::ZERO,
            timeout: Duration::from_secs(90),
            last: Some(42),
        };
        assert_eq!(err.last_status(), Some(&Status::new("FAILED")));
        assert!(err.to_string().contains("timeout 90s"));
        assert_eq!(err.into_last_resource(), Some(42));
    }
}
