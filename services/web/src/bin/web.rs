//! services/web/src/bin/web.rs

use async_openai::{config::OpenAIConfig, Client};
use axum::http::{header::CONTENT_TYPE, HeaderValue, Method};
use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use summarizer_core::{dispatch::ModelRegistry, domain::Language};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use web_lib::{
    adapters::{DbAdapter, LogMailer, OpenAiSummaryAdapter},
    config::Config,
    error::ApiError,
    web::{router, ApiDoc, AppState},
};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .init();
    info!(log_file = %config.log_file.display(), "Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_adapter = Arc::new(DbAdapter::connect(&config.database_url).await?);
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let mut openai_config = OpenAIConfig::new().with_api_key(
        config
            .openai_api_key
            .as_ref()
            .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?,
    );
    if let Some(base_url) = &config.openai_base_url {
        openai_config = openai_config.with_api_base(base_url);
    }
    let openai_client = Client::with_config(openai_config);

    let models = ModelRegistry::new(
        Arc::new(OpenAiSummaryAdapter::new(
            openai_client.clone(),
            config.english_model.clone(),
            Language::English,
        )),
        Arc::new(OpenAiSummaryAdapter::new(
            openai_client,
            config.french_model.clone(),
            Language::French,
        )),
    );
    info!(
        english_model = %config.english_model,
        french_model = %config.french_model,
        "Summarization models configured"
    );

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(
        db_adapter,
        config.clone(),
        models,
        Arc::new(LogMailer::new()),
    ));

    // --- 5. Create the Web Router ---
    let mut app = router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    if let Some(origin) = &config.cors_origin {
        let origin = origin.parse::<HeaderValue>().map_err(|e| {
            ApiError::Internal(format!("Invalid CORS_ORIGIN '{}': {}", origin, e))
        })?;
        let cors = CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([CONTENT_TYPE]);
        app = app.layer(cors);
    }

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
