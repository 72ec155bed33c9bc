use std::sync::Arc;

use bytes::Bytes;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::exec::ExecutionHandle;
use crate::model::ResultGroup;
use crate::query::parse_query;
use crate::shared::headers::select_forwardable;
use crate::trace::RequestTrace;

use super::context::ExecutionContext;
use super::errors::GatewayError;
use super::outcome::{Outcome, OutcomeCell};
use super::services::GatewayServices;

/// Raw inbound request: opaque payload plus the full header set.
pub struct RawRequest {
    pub body: Bytes,
    pub headers: Vec<(String, String)>,
}

/// Lifecycle of one dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Init,
    Dispatched,
    CompletedOk,
    CompletedErr,
    Responded,
}

/// Request-scoped state carried between the dispatch and response phases.
/// The two phases run on unrelated call stacks; everything they share lives
/// here rather than in stack-resident closures.
pub struct InFlightRequest {
    context: Arc<ExecutionContext>,
    outcome: OutcomeCell,
    state: DispatchState,
}

impl InFlightRequest {
    fn new(context: Arc<ExecutionContext>) -> Self {
        Self {
            context,
            outcome: OutcomeCell::new(),
            state: DispatchState::Init,
        }
    }

    pub fn context(&self) -> &Arc<ExecutionContext> {
        &self.context
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn has_outcome(&self) -> bool {
        self.outcome.is_set()
    }

    /// Records a completed backend outcome and advances the state machine.
    fn complete(&mut self, outcome: Outcome) {
        self.state = match &outcome {
            Outcome::Result(_) => DispatchState::CompletedOk,
            Outcome::Error(_) => DispatchState::CompletedErr,
        };
        self.outcome.set(outcome);
    }
}

/// Response value of a completed query, handed to the serializer.
pub struct CompletedQuery {
    pub group: ResultGroup,
    pub trace: Option<Arc<RequestTrace>>,
}

/// Orchestrates the two-phase query lifecycle: dispatch without blocking,
/// store the backend outcome when the completion fires, then resume and
/// produce the response value.
pub struct DispatchController {
    services: Arc<GatewayServices>,
}

impl DispatchController {
    pub fn new(services: Arc<GatewayServices>) -> Self {
        Self { services }
    }

    /// Full lifecycle for one request.
    pub async fn handle(&self, raw: RawRequest) -> Result<CompletedQuery, GatewayError> {
        let (mut in_flight, handle) = self.dispatch(raw)?;
        self.await_completion(&mut in_flight, handle).await?;
        self.resume(in_flight)
    }

    /// Phase 1: select headers, validate the payload, build the per-request
    /// context, open the root span and hand the query to the execution
    /// delegate. Fails fast on client input faults; produces no response.
    pub fn dispatch(
        &self,
        raw: RawRequest,
    ) -> Result<(InFlightRequest, ExecutionHandle), GatewayError> {
        let query = parse_query(&raw.body)?;
        let forwarded = select_forwardable(&raw.headers);
        let executor = self.services.executor()?;
        let trace = self.services.tracer.trace_query();

        let context = Arc::new(ExecutionContext::new(
            Arc::clone(&self.services),
            forwarded,
            trace,
        ));
        let mut in_flight = InFlightRequest::new(context);

        debug!(
            target: "tsgate::dispatch",
            group_id = %query.group_id,
            metrics = query.metrics.len(),
            "dispatching query"
        );
        let handle = executor.execute(query, Arc::clone(&in_flight.context));
        in_flight.state = DispatchState::Dispatched;
        Ok((in_flight, handle))
    }

    /// Bounded wait for the completion continuation; stores the outcome into
    /// the request-scoped cell. An elapsed wait is a host-level failure: the
    /// in-flight backend call is not cancelled.
    pub async fn await_completion(
        &self,
        in_flight: &mut InFlightRequest,
        handle: ExecutionHandle,
    ) -> Result<(), GatewayError> {
        let wait = self.services.async_timeout;
        match timeout(wait, handle.completed()).await {
            Ok(Ok(group)) => {
                debug!(target: "tsgate::dispatch", series = group.series_count(), "query responded");
                in_flight.complete(Outcome::Result(group));
                Ok(())
            }
            Ok(Err(error)) => {
                error.log_failures();
                in_flight.complete(Outcome::Error(error));
                Ok(())
            }
            Err(_) => {
                warn!(
                    target: "tsgate::dispatch",
                    ?wait,
                    "backend did not complete within the bounded wait; work may still be running"
                );
                Err(GatewayError::DispatchTimeout(wait))
            }
        }
    }

    /// Phase 2: read the stored outcome exactly once and produce the
    /// response value. The first trace span finishes here, before any bytes
    /// are flushed; a later serialization failure cannot leave it open.
    pub fn resume(&self, mut in_flight: InFlightRequest) -> Result<CompletedQuery, GatewayError> {
        let outcome = in_flight
            .outcome
            .take()
            .ok_or(GatewayError::ResumeConsistency)?;
        let trace = in_flight.context.trace().cloned();
        if let Some(trace) = &trace {
            trace.finish_first();
        }
        in_flight.state = DispatchState::Responded;
        debug!(target: "tsgate::dispatch", state = ?in_flight.state, "query completed");

        match outcome {
            Outcome::Result(group) => Ok(CompletedQuery { group, trace }),
            Outcome::Error(error) => Err(GatewayError::Execution(error)),
        }
    }
}
