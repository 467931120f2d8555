use std::sync::Arc;

use doppel_config::AppConfig;
use doppel_store::InMemoryStore;
use tracing::info;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    doppel_gateway::init_tracing();

    let config = AppConfig::from_env();
    info!(config = ?config, "Starting doppel gateway");

    let store = Arc::new(InMemoryStore::new());
    doppel_gateway::serve(config, store).await
}
