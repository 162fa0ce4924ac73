pub mod dashboards;
pub mod handlers;
pub mod routes;
pub mod shared;
pub mod state;
pub mod system;

use anyhow::Context;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let loaded = shared::config::load_config().context("failed to load config.toml")?;
    let config = loaded.config;

    let log_file = system::tracing::initialize(&config.log.filter)?;
    tracing::info!("Logging to {}", log_file.display());
    match &loaded.source {
        Some(path) => tracing::info!("Config loaded from {}", path.display()),
        None => tracing::warn!("config.toml not found next to the executable, using embedded defaults"),
    }

    let catalog = shared::kpi::MetricCatalog::global();
    tracing::info!("KPI catalog loaded: {} metrics", catalog.all().len());
    match config.dataset.seed {
        Some(seed) => tracing::info!("Synthetic dataset seed: {seed}"),
        None => tracing::info!("Synthetic dataset seed: entropy"),
    }

    let state = state::AppState::from_config(&config);
    let app = routes::configure_routes(state, &config.server.static_dir);

    let addr = config.server.socket_addr()?;

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    addr.port()
                );
            } else {
                tracing::error!("Failed to bind to {}. Error: {}", addr, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
