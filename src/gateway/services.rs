use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::exec::QueryExecutor;
use crate::exec::multi_cluster::MultiClusterExecutor;
use crate::exec::remote::{ForwardedHeaderProvider, RemoteContextProvider};
use crate::shared::config::CONFIG;
use crate::trace::{QueryTracer, tracer_from_config};

use super::errors::GatewayError;

/// Process-wide services. Built once at startup, read-only afterwards.
pub struct GatewayServices {
    executor: Option<Arc<dyn QueryExecutor>>,
    pub tracer: Arc<dyn QueryTracer>,
    pub remote: Arc<dyn RemoteContextProvider>,
    /// Bounded wait registered for backend completion.
    pub async_timeout: Duration,
}

impl GatewayServices {
    pub fn new(
        executor: Option<Arc<dyn QueryExecutor>>,
        tracer: Arc<dyn QueryTracer>,
        remote: Arc<dyn RemoteContextProvider>,
        async_timeout: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            executor,
            tracer,
            remote,
            async_timeout,
        })
    }

    pub fn from_config() -> Arc<Self> {
        let executor: Option<Arc<dyn QueryExecutor>> = if CONFIG.backend.clusters.is_empty() {
            warn!(
                target: "tsgate::gateway",
                "no backend clusters configured; queries will fail with an internal fault"
            );
            None
        } else {
            Some(Arc::new(MultiClusterExecutor::new(
                CONFIG.backend.clusters.clone(),
                Duration::from_millis(CONFIG.backend.request_timeout_ms),
            )))
        };

        Self::new(
            executor,
            tracer_from_config(CONFIG.tracing.enabled),
            Arc::new(ForwardedHeaderProvider),
            Duration::from_millis(CONFIG.query.async_timeout_ms),
        )
    }

    /// The execution delegate, or a `MissingService` fault when absent.
    pub fn executor(&self) -> Result<Arc<dyn QueryExecutor>, GatewayError> {
        self.executor
            .clone()
            .ok_or(GatewayError::MissingService("query executor"))
    }
}
