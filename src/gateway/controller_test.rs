use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use hyper::StatusCode;
use parking_lot::Mutex;

use crate::exec::delegate::{CompletionSender, ExecutionHandle, ExecutionResult, QueryExecutor};
use crate::exec::error::{AggregateExecutionError, ClusterFailure};
use crate::exec::remote::ForwardedHeaderProvider;
use crate::gateway::context::ExecutionContext;
use crate::gateway::controller::{DispatchController, DispatchState, RawRequest};
use crate::gateway::errors::GatewayError;
use crate::gateway::services::GatewayServices;
use crate::model::{DataPoint, ResultGroup, Series, SeriesGroup, SeriesId};
use crate::query::ValidatedQuery;
use crate::trace::{NoopTracer, QueryTracer, RecordingTracer};

/// Completes the handle immediately with a canned result.
struct FixedExecutor {
    result: Mutex<Option<ExecutionResult>>,
}

impl FixedExecutor {
    fn ok(group: ResultGroup) -> Arc<Self> {
        Arc::new(Self {
            result: Mutex::new(Some(Ok(group))),
        })
    }

    fn err(error: AggregateExecutionError) -> Arc<Self> {
        Arc::new(Self {
            result: Mutex::new(Some(Err(error))),
        })
    }
}

impl QueryExecutor for FixedExecutor {
    fn execute(&self, _query: ValidatedQuery, _ctx: Arc<ExecutionContext>) -> ExecutionHandle {
        let (completion, handle) = ExecutionHandle::channel();
        match self.result.lock().take().expect("executor reused") {
            Ok(group) => completion.succeed(group),
            Err(error) => completion.fail(error),
        }
        handle
    }
}

/// Never fires either continuation; keeps the sender alive so the channel
/// stays open.
#[derive(Default)]
struct HangingExecutor {
    held: Mutex<Vec<CompletionSender>>,
}

impl QueryExecutor for HangingExecutor {
    fn execute(&self, _query: ValidatedQuery, _ctx: Arc<ExecutionContext>) -> ExecutionHandle {
        let (completion, handle) = ExecutionHandle::channel();
        self.held.lock().push(completion);
        handle
    }
}

fn services_with(
    executor: Option<Arc<dyn QueryExecutor>>,
    tracer: Arc<dyn QueryTracer>,
    timeout_ms: u64,
) -> Arc<GatewayServices> {
    GatewayServices::new(
        executor,
        tracer,
        Arc::new(ForwardedHeaderProvider),
        Duration::from_millis(timeout_ms),
    )
}

fn expect_err(result: Result<crate::gateway::CompletedQuery, GatewayError>) -> GatewayError {
    match result {
        Err(err) => err,
        Ok(_) => panic!("expected an error"),
    }
}

fn valid_request() -> RawRequest {
    let body = r#"{"start": 1000, "end": 2000, "queries": [{"metric": "sys.cpu", "aggregator": "sum"}]}"#;
    RawRequest {
        body: Bytes::from_static(body.as_bytes()),
        headers: vec![
            ("X-Auth".to_string(), "abc".to_string()),
            ("Cookie".to_string(), "sid=1".to_string()),
            ("Accept".to_string(), "*/*".to_string()),
        ],
    }
}

fn one_series_group() -> ResultGroup {
    let id = SeriesId::new("sys.cpu").with_tag("host", "a");
    ResultGroup {
        group_id: String::new(),
        groups: vec![SeriesGroup {
            group_id: "east".to_string(),
            series: vec![Series::from_points(
                id,
                vec![DataPoint::integer(1000, 42)],
            )],
        }],
    }
}

fn two_cluster_failures() -> AggregateExecutionError {
    AggregateExecutionError::new(vec![
        ClusterFailure {
            cluster: "east".to_string(),
            status: Some(500),
            message: "storage offline".to_string(),
        },
        ClusterFailure {
            cluster: "west".to_string(),
            status: Some(503),
            message: "overloaded".to_string(),
        },
    ])
}

#[tokio::test]
async fn dispatch_transitions_without_producing_a_response() {
    crate::logging::init_for_tests();
    let executor = Arc::new(HangingExecutor::default());
    let services = services_with(Some(executor.clone()), Arc::new(NoopTracer), 1_000);
    let controller = DispatchController::new(services);

    let (in_flight, _handle) = controller.dispatch(valid_request()).unwrap();
    assert_eq!(in_flight.state(), DispatchState::Dispatched);
    assert!(!in_flight.has_outcome());
    assert_eq!(executor.held.lock().len(), 1);
}

#[tokio::test]
async fn dispatch_selects_only_forwardable_headers() {
    let services = services_with(
        Some(Arc::new(HangingExecutor::default())),
        Arc::new(NoopTracer),
        1_000,
    );
    let controller = DispatchController::new(services);

    let (in_flight, _handle) = controller.dispatch(valid_request()).unwrap();
    let forwarded = in_flight.context().forwarded_headers();
    assert_eq!(forwarded.len(), 2);
    assert!(forwarded.contains_key("X-Auth"));
    assert!(forwarded.contains_key("Cookie"));
}

#[tokio::test]
async fn stored_result_resumes_into_a_success_response() {
    let services = services_with(
        Some(FixedExecutor::ok(one_series_group())),
        Arc::new(NoopTracer),
        1_000,
    );
    let controller = DispatchController::new(services);

    let completed = controller.handle(valid_request()).await.unwrap();
    assert_eq!(completed.group.series_count(), 1);
    assert!(completed.trace.is_none());
}

#[tokio::test]
async fn stored_error_resumes_into_an_error_response() {
    let services = services_with(
        Some(FixedExecutor::err(two_cluster_failures())),
        Arc::new(NoopTracer),
        1_000,
    );
    let controller = DispatchController::new(services);

    let err = expect_err(controller.handle(valid_request()).await);
    match &err {
        GatewayError::Execution(aggregate) => assert_eq!(aggregate.failures.len(), 2),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn client_flagged_backend_failure_maps_to_a_client_error() {
    let aggregate = AggregateExecutionError::new(vec![ClusterFailure {
        cluster: "east".to_string(),
        status: Some(400),
        message: "unknown metric".to_string(),
    }]);
    let services = services_with(
        Some(FixedExecutor::err(aggregate)),
        Arc::new(NoopTracer),
        1_000,
    );
    let controller = DispatchController::new(services);

    let err = expect_err(controller.handle(valid_request()).await);
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn resume_without_outcome_is_a_consistency_fault() {
    let services = services_with(
        Some(Arc::new(HangingExecutor::default())),
        Arc::new(NoopTracer),
        1_000,
    );
    let controller = DispatchController::new(services);

    let (in_flight, _handle) = controller.dispatch(valid_request()).unwrap();
    let err = expect_err(controller.resume(in_flight));
    assert!(matches!(err, GatewayError::ResumeConsistency));
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn elapsed_bounded_wait_times_the_request_out() {
    let services = services_with(
        Some(Arc::new(HangingExecutor::default())),
        Arc::new(NoopTracer),
        10,
    );
    let controller = DispatchController::new(services);

    let err = expect_err(controller.handle(valid_request()).await);
    assert!(matches!(err, GatewayError::DispatchTimeout(_)));
    assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn missing_executor_is_an_internal_fault() {
    let services = services_with(None, Arc::new(NoopTracer), 1_000);
    let controller = DispatchController::new(services);

    let err = expect_err(controller.handle(valid_request()).await);
    assert!(matches!(err, GatewayError::MissingService(_)));
    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn client_input_faults_fail_fast_without_a_backend_call() {
    let executor = Arc::new(HangingExecutor::default());
    let services = services_with(Some(executor.clone()), Arc::new(NoopTracer), 1_000);
    let controller = DispatchController::new(services);

    let raw = RawRequest {
        body: Bytes::from_static(b"{not json"),
        headers: Vec::new(),
    };
    let err = expect_err(controller.handle(raw).await);
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert!(executor.held.lock().is_empty());
}

#[tokio::test]
async fn first_span_finishes_once_the_response_is_determined() {
    let services = services_with(
        Some(FixedExecutor::ok(one_series_group())),
        Arc::new(RecordingTracer),
        1_000,
    );
    let controller = DispatchController::new(services);

    let completed = controller.handle(valid_request()).await.unwrap();
    let trace = completed.trace.expect("tracing enabled");
    assert!(trace.is_finished(trace.first_span()));
}
