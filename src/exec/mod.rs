pub mod delegate;
pub mod error;
pub mod multi_cluster;
pub mod remote;

pub use delegate::{CompletionSender, ExecutionHandle, ExecutionResult, QueryExecutor};
pub use error::{AggregateExecutionError, ClusterFailure};
