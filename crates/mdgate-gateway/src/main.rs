//! mdgate gateway binary.
//!
//! - Config: `MDGATE_CONFIG` (default `mdgate.yaml`, built-in defaults if absent)
//! - Logging: `RUST_LOG` via tracing-subscriber `EnvFilter`
//! - Ctrl-C / SIGTERM: mark draining, then graceful shutdown

use std::path::Path;

use tracing_subscriber::{fmt, EnvFilter};

use mdgate_core::error::{Result, MdGateError};
use mdgate_gateway::{app_state::AppState, config, router};

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = config::config_path();
    let cfg = if std::env::var_os(config::CONFIG_ENV).is_none() && !Path::new(&path).exists() {
        tracing::info!(path = %path, "no config file; using built-in defaults");
        config::GatewayConfig::default()
    } else {
        config::load_from_file(&path)?
    };

    let listen = cfg.gateway.listen_addr()?;
    let metrics_path = cfg.metrics.path.clone();

    let state = AppState::new(cfg)?;
    let app = router::build_router(state.clone());

    tracing::info!(%listen, %metrics_path, "mdgate-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| MdGateError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .map_err(|e| MdGateError::Internal(format!("server failed: {e}")))?;

    tracing::info!("mdgate-gateway stopped");
    Ok(())
}

async fn shutdown_signal(state: AppState) {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    state.set_draining();
    tracing::info!("shutdown signal received; draining");
}
