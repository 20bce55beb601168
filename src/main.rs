use anyhow::Result;
use power_forecast_service::{api, config::Config, service::AppState, telemetry};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let cfg = Config::load()?;
    let state = AppState::new(cfg.clone()).await?;
    let app = api::router(state, &cfg);

    let addr = cfg.server.socket_addr()?;

    if cfg.server.host == "0.0.0.0" {
        warn!(
            "server binding to 0.0.0.0 - service will be accessible from the network; \
            bind to 127.0.0.1 unless behind a firewall/reverse proxy"
        );
    }

    info!(%addr, "starting power forecast service");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    warn!("shutdown complete");
    Ok(())
}
