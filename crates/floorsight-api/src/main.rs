use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use floorsight_advisor::AdvisorPipeline;
use floorsight_core::loader::load_assets;
use floorsight_llm::GeminiClient;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use floorsight_api::exchange_log::ExchangeLog;
use floorsight_api::{create_router, ApiConfig, AppState, SharedModel};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "floorsight_api=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::load().context("Failed to load configuration")?;

    tracing::info!(
        port = config.port,
        model = %config.model,
        data_dir = %config.data_layout.root().display(),
        timeout_secs = config.timeout.as_secs(),
        cooldown_ms = config.cooldown.as_millis() as u64,
        "Starting Floorsight API server"
    );

    let assets = load_assets(&config.data_layout).with_context(|| {
        format!("Failed to load assets from {}", config.data_layout.root().display())
    })?;

    let client = GeminiClient::new(&config.api_key, &config.model, config.timeout)
        .context("Failed to build the model client")?
        .with_base_url(&config.model_url);
    let model: SharedModel = Arc::new(client);

    let pipeline = AdvisorPipeline::new(model, config.templates.clone(), config.pipeline_settings());
    let mut state = AppState::new(Arc::new(assets), pipeline);

    if let Some(path) = &config.exchange_log {
        let log = ExchangeLog::open(path)
            .await
            .with_context(|| format!("Failed to open exchange log {}", path.display()))?;
        state = state.with_exchange_log(log);
    }

    let mut app = create_router(Arc::new(state));

    if let Some(origin) = &config.cors_origin {
        let origin = origin
            .parse::<HeaderValue>()
            .with_context(|| format!("Invalid CORS origin '{}'", origin))?;
        let cors = CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]);
        app = app.layer(cors);
        tracing::info!(origin = ?config.cors_origin, "CORS enabled");
    }

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
