use std::sync::Arc;

use dotenvy::dotenv;
use tokio::net::TcpListener;

use eventdesk_server::config::Config;
use eventdesk_server::routes::create_routes;
use eventdesk_server::store::{MemoryStore, PgStore, Store};
use eventdesk_server::utils::telemetry::init_tracing;
use eventdesk_server::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing();

    let config = Config::from_env()?;

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url, config.database_max_connections).await?;
            store.migrate().await?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL is not set, running on the in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let app = create_routes(AppState::new(store), &config);

    let addr = config.bind_addr();
    tracing::info!("Server running at http://{}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
