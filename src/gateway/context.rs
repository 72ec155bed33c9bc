use std::collections::HashMap;
use std::sync::Arc;

use crate::trace::RequestTrace;

use super::services::GatewayServices;

/// Per-request bundle shared by both dispatch phases: the process-wide
/// services, the forwarded header subset, and the optional trace handle.
/// Created once per request and never shared across requests.
pub struct ExecutionContext {
    services: Arc<GatewayServices>,
    forwarded_headers: HashMap<String, String>,
    trace: Option<Arc<RequestTrace>>,
}

impl ExecutionContext {
    pub fn new(
        services: Arc<GatewayServices>,
        forwarded_headers: HashMap<String, String>,
        trace: Option<Arc<RequestTrace>>,
    ) -> Self {
        Self {
            services,
            forwarded_headers,
            trace,
        }
    }

    pub fn services(&self) -> &Arc<GatewayServices> {
        &self.services
    }

    pub fn forwarded_headers(&self) -> &HashMap<String, String> {
        &self.forwarded_headers
    }

    pub fn trace(&self) -> Option<&Arc<RequestTrace>> {
        self.trace.as_ref()
    }
}
