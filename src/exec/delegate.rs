use std::sync::Arc;
use tokio::sync::oneshot;

use crate::gateway::context::ExecutionContext;
use crate::model::ResultGroup;
use crate::query::ValidatedQuery;

use super::error::AggregateExecutionError;

pub type ExecutionResult = Result<ResultGroup, AggregateExecutionError>;

/// Completion side of a dispatched query. Consuming `self` makes the
/// continuation fire at most once by construction.
pub struct CompletionSender(oneshot::Sender<ExecutionResult>);

impl CompletionSender {
    pub fn succeed(self, group: ResultGroup) {
        let _ = self.0.send(Ok(group));
    }

    pub fn fail(self, error: AggregateExecutionError) {
        let _ = self.0.send(Err(error));
    }
}

/// Handle to an in-flight backend execution.
pub struct ExecutionHandle {
    rx: oneshot::Receiver<ExecutionResult>,
}

impl ExecutionHandle {
    pub fn channel() -> (CompletionSender, ExecutionHandle) {
        let (tx, rx) = oneshot::channel();
        (CompletionSender(tx), ExecutionHandle { rx })
    }

    /// Resolves once the backend completes, on whichever task the delegate
    /// completed from. A dropped sender surfaces as an internal failure.
    pub async fn completed(self) -> ExecutionResult {
        self.rx.await.unwrap_or_else(|_| {
            Err(AggregateExecutionError::internal(
                "executor dropped the completion channel",
            ))
        })
    }
}

/// The distributed query execution delegate. The per-request context carries
/// the forwarded headers and the parent trace handle the delegate may use.
pub trait QueryExecutor: Send + Sync {
    /// Dispatches the validated query without blocking; the returned handle
    /// must be completed exactly once.
    fn execute(&self, query: ValidatedQuery, ctx: Arc<ExecutionContext>) -> ExecutionHandle;
}
