//! Bubo HTTP server
//!
//! Wires the external integrations (Gemini, Firebase Realtime Database,
//! Google Drive, the SQLite exchange log) into the agent and exposes the
//! `/ask` and `/health` endpoints.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::header::{HeaderValue, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bubo::{
    AgentEngine, DriveListTool, MemoryRepository, RealtimeReadTool, SpreadsheetReadTool,
    ToolRegistry,
};

mod adapters;
mod config;
mod routes;
mod services;

use adapters::{DriveClient, GoogleAuth, RealtimeDb, SqliteMemoryRepository};
use config::Config;
use services::GeminiAgent;

/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<dyn AgentEngine>,
    pub memory: Arc<dyn MemoryRepository>,
    /// Integrations wired at startup, reported verbatim by `/health`
    pub services: Arc<Vec<String>>,
}

/// Build the router with its middleware stack.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::ask::router())
        .merge(routes::health::router())
        .layer(CorsLayer::permissive())
        .layer(SetResponseHeaderLayer::overriding(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bubo_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("failed to load configuration")?;

    // The one bootstrap side effect: the memory schema exists before the
    // server accepts requests.
    let memory = Arc::new(
        SqliteMemoryRepository::connect(&config.database_path)
            .await
            .with_context(|| format!("failed to open {}", config.database_path))?,
    );
    tracing::info!(path = %config.database_path, "memory table ready");

    let realtime = match &config.firebase {
        Some(firebase) => {
            tracing::info!(
                project_id = %firebase.project_id,
                client_email = %firebase.client_email,
                "🔥 Firebase realtime database wired"
            );
            Arc::new(RealtimeDb::new(firebase).context("firebase service account credentials")?)
        }
        None => {
            tracing::warn!("FIREBASE_PRIVATE_KEY not set - realtime database tool disabled");
            Arc::new(RealtimeDb::disabled())
        }
    };

    let drive = match &config.google {
        Some(google) => {
            tracing::info!(redirect_uri = %google.redirect_uri, "google oauth client configured");
            let auth = Arc::new(GoogleAuth::new(google));
            if !auth.has_delegated_access() {
                tracing::warn!(
                    "GOOGLE_REFRESH_TOKEN not set - drive listing reports unavailable"
                );
            }
            Arc::new(DriveClient::new(auth))
        }
        None => {
            tracing::warn!("google oauth credentials not set - drive tool disabled");
            Arc::new(DriveClient::disabled())
        }
    };

    let mut services = vec![
        "axum".to_string(),
        "gemini".to_string(),
        "sqlite".to_string(),
    ];
    if realtime.is_enabled() {
        services.push("firebase".to_string());
    }
    if drive.is_enabled() {
        services.push("google-drive".to_string());
    }

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(RealtimeReadTool::new(realtime)))?;
    registry.register(Arc::new(SpreadsheetReadTool::new()))?;
    registry.register(Arc::new(DriveListTool::new(drive)))?;
    tracing::info!(tools = ?registry.names(), "tool registry ready");

    let agent = GeminiAgent::new(config.gemini_api_key.clone(), Arc::new(registry))
        .with_model(config.gemini_model.clone());

    let state = AppState {
        agent: Arc::new(agent),
        memory,
        services: Arc::new(services),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("🦉 Bubo is flying high on port {}", config.port);
    axum::serve(listener, app(state)).await?;

    Ok(())
}
