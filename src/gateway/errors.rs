use std::time::Duration;

use hyper::StatusCode;
use thiserror::Error;

use crate::exec::AggregateExecutionError;
use crate::query::QueryParseError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Parse(#[from] QueryParseError),

    #[error("required service not registered: {0}")]
    MissingService(&'static str),

    #[error(transparent)]
    Execution(#[from] AggregateExecutionError),

    /// The bounded wait elapsed without either continuation firing. The
    /// backend call may still be running; it is not cancelled here.
    #[error("backend did not complete within {0:?}")]
    DispatchTimeout(Duration),

    /// Phase 2 was entered without a stored outcome; a controller bug, not
    /// retried.
    #[error("resumed request has no stored outcome")]
    ResumeConsistency,

    #[error("result serialization failed: {0}")]
    Serialization(#[from] std::io::Error),
}

impl GatewayError {
    /// Response status for faults raised before streaming begins.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Parse(_) => StatusCode::BAD_REQUEST,
            GatewayError::Execution(e) if e.is_client_fault() => StatusCode::BAD_REQUEST,
            GatewayError::Execution(_) => StatusCode::BAD_GATEWAY,
            GatewayError::DispatchTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::MissingService(_)
            | GatewayError::ResumeConsistency
            | GatewayError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
