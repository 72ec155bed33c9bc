use thiserror::Error;
use tracing::{debug, error};

/// One failed cluster within a fan-out.
#[derive(Debug, Clone)]
pub struct ClusterFailure {
    pub cluster: String,
    /// Upstream HTTP status, when the cluster answered at all.
    pub status: Option<u16>,
    pub message: String,
}

impl ClusterFailure {
    pub fn is_client_fault(&self) -> bool {
        self.status.is_some_and(|s| (400..500).contains(&s))
    }
}

/// Aggregate failure across a multi-cluster fan-out. Carries every
/// underlying failure so partial-failure detail survives to the logs.
#[derive(Debug, Clone, Error)]
#[error("{} backend cluster query(ies) failed", .failures.len())]
pub struct AggregateExecutionError {
    pub failures: Vec<ClusterFailure>,
}

impl AggregateExecutionError {
    pub fn new(failures: Vec<ClusterFailure>) -> Self {
        Self { failures }
    }

    /// Failure local to the gateway rather than any cluster.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            failures: vec![ClusterFailure {
                cluster: "<gateway>".to_string(),
                status: None,
                message: message.into(),
            }],
        }
    }

    /// True when every underlying failure was flagged as client-caused.
    pub fn is_client_fault(&self) -> bool {
        !self.failures.is_empty() && self.failures.iter().all(ClusterFailure::is_client_fault)
    }

    /// Logs each underlying failure individually so multi-cluster
    /// diagnostics are not flattened into one message.
    pub fn log_failures(&self) {
        for failure in &self.failures {
            error!(
                target: "tsgate::exec",
                cluster = %failure.cluster,
                status = ?failure.status,
                "cluster query failed: {}",
                failure.message
            );
        }
        debug!(target: "tsgate::exec", count = self.failures.len(), "aggregate execution failure");
    }
}
