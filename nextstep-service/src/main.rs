use metrics_exporter_prometheus::PrometheusBuilder;
use nextstep_service::{build_router, build_state, config::NextStepConfig};
use service_core::observability::logging::init_tracing;
use std::net::SocketAddr;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), service_core::error::AppError> {
    // Load configuration - fail fast if invalid
    let config = NextStepConfig::from_env()?;

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    );

    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| service_core::error::AppError::ConfigError(anyhow::anyhow!(e)))?;

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting next-step service"
    );

    let bootstrap = config.operation.bootstrap_step_definitions;
    let port = config.common.port;
    let service_name = config.service_name.clone();
    let service_version = config.service_version.clone();
    let environment = format!("{:?}", config.environment);

    let state = build_state(config, metrics_handle);

    if bootstrap {
        state
            .step_definitions
            .bootstrap_default_definitions()
            .await
            .map_err(service_core::error::AppError::from)?;
    }

    let app = build_router(state).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let service_span = tracing::info_span!(
        "service",
        service = %service_name,
        version = %service_version,
        environment = %environment,
    );
    let _guard = service_span.enter();

    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    service_core::axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
