pub mod http;

use crate::gateway::GatewayServices;

pub async fn start_all() -> anyhow::Result<()> {
    let services = GatewayServices::from_config();
    http::listener::run_http_server(services).await
}
