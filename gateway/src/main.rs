mod api;

use anyhow::Context;
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// Internal imports
use crate::api::{DispatchResponse, ErrorResponse};
use catalog_core::settings::{Settings, SinkMode};
use catalog_core::{
    tools, Catalog, EventHandler, LogSink, OpenAiSink, RequiredAction, RunId, ToolOutputSink,
};

/// Hands out the sink a run's outputs are submitted to.
trait SinkProvider: Send + Sync {
    fn for_thread(&self, thread_id: &str) -> Arc<dyn ToolOutputSink>;
}

struct OpenAiSinks {
    client: Client<OpenAIConfig>,
}

impl SinkProvider for OpenAiSinks {
    fn for_thread(&self, thread_id: &str) -> Arc<dyn ToolOutputSink> {
        Arc::new(OpenAiSink::new(self.client.clone(), thread_id))
    }
}

impl SinkProvider for LogSink {
    fn for_thread(&self, _thread_id: &str) -> Arc<dyn ToolOutputSink> {
        Arc::new(*self)
    }
}

// Shared across requests: the catalog is read-only, sinks are built per run
#[derive(Clone)]
struct AppState {
    catalog: Arc<Catalog>,
    sinks: Arc<dyn SinkProvider>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logging Setup
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    info!("Catalog Gateway Initializing...");
    let settings = Settings::from_env()?;

    // 2. Load the catalog once; it is never written after this
    let catalog = Catalog::load(&settings.catalog_path)
        .await
        .with_context(|| format!("failed to load catalog from {:?}", settings.catalog_path))?;
    info!("Serving {} products.", catalog.len());

    // 3. Pick where tool outputs go
    let sinks: Arc<dyn SinkProvider> = match settings.sink {
        SinkMode::OpenAi { api_key } => {
            info!("Tool outputs will be submitted to OpenAI.");
            let config = OpenAIConfig::new().with_api_key(api_key);
            Arc::new(OpenAiSinks {
                client: Client::with_config(config),
            })
        }
        SinkMode::Log => {
            info!("Tool outputs will only be logged.");
            Arc::new(LogSink)
        }
    };

    let state = AppState {
        catalog: Arc::new(catalog),
        sinks,
    };

    // 4. Start Server
    let listener = TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;
    info!("Gateway listening on {}...", settings.bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/tools", get(list_tools))
        .route("/products", get(list_products))
        .route(
            "/threads/{thread_id}/runs/{run_id}/required-action",
            post(handle_required_action),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// --- HANDLERS ---

async fn health_check() -> &'static str {
    "Catalog Gateway: Operational"
}

async fn list_tools() -> Json<Vec<Value>> {
    Json(tools::definitions())
}

async fn list_products(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.catalog.iter().map(|p| p.name.clone()).collect())
}

async fn handle_required_action(
    State(state): State<AppState>,
    Path((thread_id, run_id)): Path<(String, String)>,
    Json(action): Json<RequiredAction>,
) -> Result<Json<DispatchResponse>, (StatusCode, Json<ErrorResponse>)> {
    info!(
        "Thread '{}' run '{}' sent {} tool calls",
        thread_id,
        run_id,
        action.tool_calls().len()
    );

    let handler = EventHandler::new(state.catalog.clone(), state.sinks.for_thread(&thread_id));
    let run_id = RunId::new(run_id);

    match handler.handle_requires_action(&action, &run_id).await {
        Ok(tool_outputs) => Ok(Json(DispatchResponse {
            run_id: run_id.to_string(),
            tool_outputs,
        })),
        Err(e) => {
            error!("Dispatch for run '{}' failed: {}", run_id, e);
            Err((
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}
