use tsgate::frontend::start_all;
use tsgate::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init()?;

    tracing::info!("tsgate is starting...");
    start_all().await?;

    Ok(())
}
