pub mod config;
pub mod convert;
pub mod error;
pub mod escape;
pub mod generate;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod negotiate;
pub mod server;
pub mod shutdown;
pub mod state;
pub mod uri;
pub mod verify;
pub mod vocabulary;

pub use config::{CliArgs, ServerConfig};
pub use convert::{ConvertError, ConvertOptions, Rendered, Target, render};
pub use error::{ApiError, ERROR_METRICS, ErrorCode, ErrorMetrics};
pub use generate::{GenerateOptions, GenerationReport, generate_site};
pub use logging::{LoggingConfig, init_logging, shutdown_telemetry};
pub use negotiate::{Format, Scope};
pub use shutdown::{ShutdownConfig, ShutdownCoordinator};
pub use vocabulary::{Vocabulary, VocabularyClass, VocabularyError, VocabularyProperty};

use anyhow::Result;
use state::AppState;
use std::{future::IntoFuture, sync::Arc};
use tokio::net::TcpListener;

pub async fn run_server(config: ServerConfig) -> Result<()> {
    let config = Arc::new(config);
    let state = Arc::new(AppState::load(config.clone())?);

    tracing::info!(
        base_url = %config.base_url,
        version = %state.vocabulary().version,
        classes = state.vocabulary().classes.len(),
        properties = state.vocabulary().properties.len(),
        "starting OER schema server",
    );

    let shutdown_config = ShutdownConfig::default().with_drain_timeout(config.shutdown_timeout);
    let coordinator = Arc::new(ShutdownCoordinator::new(shutdown_config));

    let router = server::router(state, coordinator.clone());
    let listener = TcpListener::bind(config.http_bind_address).await?;
    let actual_addr = listener.local_addr()?;
    tracing::info!(bind = %actual_addr, "listening");

    let signal_coordinator = coordinator.clone();
    let server_future = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            signal_coordinator.wait_for_signal().await;
        })
        .into_future();

    tokio::pin!(server_future);

    let server_result = tokio::select! {
        result = &mut server_future => result.map_err(anyhow::Error::from),
        _ = coordinator.drain_deadline() => {
            tracing::warn!(
                active_requests = coordinator.active_request_count(),
                "connections still open after drain timeout, stopping"
            );
            Ok(())
        }
    };

    let phase = coordinator.drain().await;
    tracing::info!(phase = %phase, "server stopped");

    server_result
}
