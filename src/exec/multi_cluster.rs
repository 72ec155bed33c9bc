use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::future::join_all;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, header};
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::json;
use tokio::time::timeout;
use tracing::debug;

use crate::gateway::context::ExecutionContext;
use crate::model::{DataPoint, ResultGroup, Series, SeriesGroup, SeriesId};
use crate::query::ValidatedQuery;
use crate::shared::config::model::ClusterConfig;

use super::delegate::{ExecutionHandle, QueryExecutor};
use super::error::{AggregateExecutionError, ClusterFailure};

type HttpClient = Client<HttpConnector, Full<Bytes>>;

/// Execution delegate that fans a query out to every configured cluster over
/// HTTP. Each cluster's series come back as one `SeriesGroup`; any cluster
/// failure fails the whole execution with one entry per failed cluster.
pub struct MultiClusterExecutor {
    clusters: Vec<ClusterConfig>,
    request_timeout: Duration,
    client: HttpClient,
}

/// Wire shape of one series in a cluster's response payload.
#[derive(Debug, Deserialize)]
struct RemoteSeries {
    metric: String,
    #[serde(default)]
    tags: IndexMap<String, String>,
    #[serde(default, rename = "aggregateTags")]
    aggregate_tags: Vec<String>,
    #[serde(default)]
    dps: IndexMap<String, serde_json::Value>,
}

impl MultiClusterExecutor {
    pub fn new(clusters: Vec<ClusterConfig>, request_timeout: Duration) -> Self {
        Self {
            clusters,
            request_timeout,
            client: Client::builder(TokioExecutor::new()).build_http(),
        }
    }

    fn query_payload(query: &ValidatedQuery) -> Bytes {
        let payload = json!({
            "start": query.range.start_ms,
            "end": query.range.end_ms,
            "groupId": query.group_id,
            "queries": query.metrics,
        });
        Bytes::from(payload.to_string())
    }

    async fn query_cluster(
        client: &HttpClient,
        cluster: &ClusterConfig,
        body: Bytes,
        headers: &HashMap<String, String>,
    ) -> Result<SeriesGroup, ClusterFailure> {
        let fail = |status: Option<u16>, message: String| ClusterFailure {
            cluster: cluster.name.clone(),
            status,
            message,
        };

        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(&cluster.url)
            .header(header::CONTENT_TYPE, "application/json");
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let request = builder
            .body(Full::new(body))
            .map_err(|e| fail(None, format!("failed to build request: {e}")))?;

        let response = client
            .request(request)
            .await
            .map_err(|e| fail(None, format!("request failed: {e}")))?;
        let status = response.status();
        let collected = response
            .into_body()
            .collect()
            .await
            .map_err(|e| fail(Some(status.as_u16()), format!("failed to read body: {e}")))?
            .to_bytes();

        if !status.is_success() {
            return Err(fail(
                Some(status.as_u16()),
                String::from_utf8_lossy(&collected).trim().to_string(),
            ));
        }

        let series: Vec<RemoteSeries> = serde_json::from_slice(&collected)
            .map_err(|e| fail(Some(status.as_u16()), format!("unparseable payload: {e}")))?;
        debug!(
            target: "tsgate::exec",
            cluster = %cluster.name,
            series = series.len(),
            "cluster responded"
        );
        Ok(SeriesGroup {
            group_id: cluster.name.clone(),
            series: series.into_iter().map(into_series).collect(),
        })
    }
}

fn into_series(remote: RemoteSeries) -> Series {
    let mut id = SeriesId::new(remote.metric);
    id.tags = remote.tags;
    id.aggregated_tags = remote.aggregate_tags;

    let points: Vec<DataPoint> = remote
        .dps
        .into_iter()
        .filter_map(|(ts, value)| {
            let timestamp_ms: i64 = ts.parse().ok()?;
            let number = value.as_number()?.clone();
            if let Some(v) = number.as_i64() {
                Some(DataPoint::integer(timestamp_ms, v))
            } else {
                number.as_f64().map(|v| DataPoint::float(timestamp_ms, v))
            }
        })
        .collect();
    Series::from_points(id, points)
}

impl QueryExecutor for MultiClusterExecutor {
    fn execute(&self, query: ValidatedQuery, ctx: Arc<ExecutionContext>) -> ExecutionHandle {
        let (completion, handle) = ExecutionHandle::channel();
        let client = self.client.clone();
        let clusters = self.clusters.clone();
        let request_timeout = self.request_timeout;
        let remote = ctx.services().remote.remote_context(&ctx);
        let group_id = query.group_id.clone();
        let body = Self::query_payload(&query);

        tokio::spawn(async move {
            let requests = clusters.iter().map(|cluster| {
                let client = client.clone();
                let body = body.clone();
                let headers = &remote.headers;
                async move {
                    match timeout(
                        request_timeout,
                        Self::query_cluster(&client, cluster, body, headers),
                    )
                    .await
                    {
                        Ok(result) => result,
                        Err(_) => Err(ClusterFailure {
                            cluster: cluster.name.clone(),
                            status: None,
                            message: format!("no response within {request_timeout:?}"),
                        }),
                    }
                }
            });

            let mut groups = Vec::new();
            let mut failures = Vec::new();
            for result in join_all(requests).await {
                match result {
                    Ok(group) => groups.push(group),
                    Err(failure) => failures.push(failure),
                }
            }
            if failures.is_empty() {
                completion.succeed(ResultGroup { group_id, groups });
            } else {
                completion.fail(AggregateExecutionError::new(failures));
            }
        });
        handle
    }
}
