//! reel-api server.

use std::net::SocketAddr;
use std::process::ExitCode;

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reel_api::{create_router, metrics, ApiConfig, AppState};
use reel_worker::WorkerConfig;

fn init_tracing(json: bool) {
    let filter = EnvFilter::from_default_env()
        .add_directive("reel=info".parse().expect("valid log directive"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env();
    init_tracing(config.json_logs);

    let worker_config = WorkerConfig::from_env();
    info!(
        bind = %config.bind_address(),
        storage_root = %worker_config.storage_root.display(),
        work_dir = %worker_config.work_dir.display(),
        "starting reel-api"
    );

    match serve(config, worker_config).await {
        Ok(()) => {
            info!("shut down cleanly");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn serve(
    config: ApiConfig,
    worker_config: WorkerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| format!("invalid bind address {}: {}", config.bind_address(), e))?;

    let state = AppState::new(config.clone(), worker_config)
        .await
        .map_err(|e| format!("could not build application state: {}", e))?;

    let metrics_handle = if config.metrics_enabled {
        metrics::init_metrics()
            .map_err(|e| warn!("metrics disabled, recorder install failed: {}", e))
            .ok()
    } else {
        None
    };

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", addr);

    axum::serve(listener, create_router(state, metrics_handle))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        // Without a signal handler, run until killed.
        Err(e) => {
            error!("cannot listen for ctrl-c: {}", e);
            std::future::pending::<()>().await
        }
    }
}
