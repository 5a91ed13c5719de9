//! Nero assistant - conversational `DeFi` action service
//!
//! A Rust backend implementing the chat assistant's action-flow state
//! machine behind an HTTP/SSE API.

mod api;
mod config;
mod gateway;
mod llm;
mod runtime;
mod state_machine;
mod system_prompt;
mod wallet;

use api::{create_router, AppState};
use config::{AppConfig, GatewayConfig};
use gateway::{ActionGateway, HttpGateway, LoggingGateway, SimulatedGateway};
use llm::{ChatService, LoggingService, OpenAIChatService};
use runtime::{SessionManager, SessionSettings};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use system_prompt::build_system_prompt;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wallet::WalletManager;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nero_assistant=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = AppConfig::from_env()?;

    // Action gateway
    let inner: Arc<dyn ActionGateway> = match &config.gateway {
        GatewayConfig::Simulated { delay } => {
            tracing::info!(delay_ms = %delay.as_millis(), "Using simulated action gateway");
            Arc::new(SimulatedGateway::new(*delay))
        }
        GatewayConfig::Http { base_url } => {
            tracing::info!(base_url = %base_url, "Using HTTP action gateway");
            Arc::new(HttpGateway::new(base_url, REQUEST_TIMEOUT)?)
        }
    };
    let gateway: Arc<dyn ActionGateway> = Arc::new(LoggingGateway::new(inner));

    // Free-text chat
    let chat_service: Arc<dyn ChatService> = Arc::new(OpenAIChatService::new(
        &config.chat_endpoint,
        &config.chat_model,
        REQUEST_TIMEOUT,
    )?);
    let chat: Arc<dyn ChatService> = Arc::new(LoggingService::new(chat_service));

    if config.default_credential.is_none() {
        tracing::warn!("OPENAI_API_KEY not set. Free-text chat needs a key set per session.");
    }

    // Create application state
    let sessions = SessionManager::new(
        gateway,
        chat,
        SessionSettings {
            swap_network: config.swap_network.clone(),
            system_prompt: build_system_prompt(&config.swap_network),
            default_credential: config.default_credential.clone(),
        },
    );
    let state = AppState::new(
        sessions,
        WalletManager::new(&config.wallet_address).with_type(config.wallet_type),
    );
    let sessions = state.sessions.clone();

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Nero assistant listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown requested");
        })
        .await?;

    sessions.close_all().await;
    Ok(())
}
