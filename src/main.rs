use std::net::SocketAddr;
use summit_checkin::config::{resolve_data_dir, resolve_port};
use summit_checkin::{router, AppState, CheckInConfig, CheckInStore, FileStorage, SystemClock};
use tokio::fs;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = CheckInConfig::from_env()?;
    let data_dir = resolve_data_dir();
    fs::create_dir_all(&data_dir).await?;

    let mut store = CheckInStore::new(config, FileStorage::new(&data_dir), SystemClock);
    let outcome = store.load();
    info!(?outcome, dir = %data_dir.display(), goal = store.config().goal, "check-in state ready");

    let app = router(AppState::new(store));

    let addr = SocketAddr::from(([0, 0, 0, 0], resolve_port()));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
