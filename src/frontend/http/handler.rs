use std::convert::Infallible;
use std::sync::Arc;

use http_body_util::BodyExt;
use hyper::header::{self, HeaderMap};
use hyper::{Method, Request, Response, StatusCode, body::Incoming};
use tracing::{debug, error};

use crate::gateway::{CompletedQuery, DispatchController, GatewayServices, RawRequest};
use crate::serialize::write_result_group;
use crate::shared::response::error_body;

use super::body::{ResponseBody, full, streaming_channel};

const QUERY_PATH: &str = "/query/v2";
const STREAM_CHANNEL_CAPACITY: usize = 16;

pub async fn handle_request(
    req: Request<Incoming>,
    services: Arc<GatewayServices>,
) -> Result<Response<ResponseBody>, Infallible> {
    match req.uri().path() {
        QUERY_PATH => {
            if req.method() != Method::POST {
                return Ok(method_not_allowed());
            }
            Ok(handle_query(req, services).await)
        }
        _ => Ok(not_found()),
    }
}

async fn handle_query(
    req: Request<Incoming>,
    services: Arc<GatewayServices>,
) -> Response<ResponseBody> {
    let headers = header_pairs(req.headers());
    let body = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            debug!(target: "tsgate::http", "failed to read request body: {}", e);
            return error_response(StatusCode::BAD_REQUEST, "unreadable request body");
        }
    };

    let controller = DispatchController::new(services);
    match controller.handle(RawRequest { body, headers }).await {
        Ok(completed) => stream_response(completed),
        Err(err) => {
            let status = err.status();
            if status.is_server_error() {
                error!(target: "tsgate::http", "query failed: {}", err);
            } else {
                debug!(target: "tsgate::http", "query rejected: {}", err);
            }
            error_response(status, &err.to_string())
        }
    }
}

/// Owned header pairs for the backend selector. Hyper lowercases incoming
/// header names; the canonical `Cookie` spelling is restored here so the
/// exact-match selection downstream still sees it.
pub(crate) fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            let value = value.to_str().ok()?.to_string();
            let name = if name == header::COOKIE {
                "Cookie".to_string()
            } else {
                name.as_str().to_string()
            };
            Some((name, value))
        })
        .collect()
}

/// Streams the serialized result. The status line goes out before the first
/// series is drained; a mid-stream failure aborts the body instead of
/// changing the status.
fn stream_response(completed: CompletedQuery) -> Response<ResponseBody> {
    let (mut sink, body) = streaming_channel(STREAM_CHANNEL_CAPACITY);
    let CompletedQuery { group, trace } = completed;
    tokio::spawn(async move {
        if let Err(e) = write_result_group(&mut sink, group, trace.as_deref()).await {
            error!(target: "tsgate::http", "aborting result stream: {}", e);
            sink.abort(e).await;
        }
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap()
}

pub(crate) fn error_response(status: StatusCode, message: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(full(error_body(status.as_u16(), message)))
        .unwrap()
}

fn method_not_allowed() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(header::ALLOW, "POST")
        .body(full("Method Not Allowed"))
        .unwrap()
}

fn not_found() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .body(full("Not Found"))
        .unwrap()
}
