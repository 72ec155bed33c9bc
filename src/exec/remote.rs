use std::collections::HashMap;

use crate::gateway::context::ExecutionContext;

/// Context handed to remote clusters alongside the query.
#[derive(Debug, Clone, Default)]
pub struct RemoteContext {
    pub headers: HashMap<String, String>,
}

/// Yields the remote-execution context for one request.
pub trait RemoteContextProvider: Send + Sync {
    fn remote_context(&self, ctx: &ExecutionContext) -> RemoteContext;
}

/// Forwards the request's selected header subset unchanged.
pub struct ForwardedHeaderProvider;

impl RemoteContextProvider for ForwardedHeaderProvider {
    fn remote_context(&self, ctx: &ExecutionContext) -> RemoteContext {
        RemoteContext {
            headers: ctx.forwarded_headers().clone(),
        }
    }
}
