pub mod api;
pub mod config;
pub mod error;
pub mod forward;
pub mod model;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;

use config::{AppConfig, RelayMode};
use forward::Forwarder;
use model::{ModelClient, ModelError, OllamaChatClient};

#[derive(Clone)]
pub enum Delivery {
    Reply,
    Forward(Forwarder),
}

#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn ModelClient>,
    pub delivery: Delivery,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Result<Self, ModelError> {
        let client = OllamaChatClient::new(&config.model)?;
        tracing::info!(
            model = client.model(),
            base_url = %config.model.base_url,
            "Initialized Ollama chat client"
        );

        let delivery = match config.mode {
            RelayMode::Answer => Delivery::Reply,
            RelayMode::Forward => {
                tracing::info!(url = %config.forward_url, "Forwarding answers");
                Delivery::Forward(Forwarder::new(config.forward_url.clone()))
            }
        };

        Ok(Self {
            model: Arc::new(client),
            delivery,
        })
    }
}

pub fn build_app(state: AppState) -> Router {
    api::router(state)
}

pub fn init_tracing(default_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

pub async fn run_server(app: Router, listener: TcpListener) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
