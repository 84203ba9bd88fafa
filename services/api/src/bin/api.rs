//! services/api/src/bin/api.rs

use api_lib::{
    adapters::ModelGateway,
    config::{self, Config},
    error::ApiError,
    web::{list_profiles_handler, rest::ApiDoc, state::AppState, ws_handler},
};
use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        Method,
    },
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize the Model Gateway ---
    // The credential chain: environment variable, then the stored credential
    // file, then interactive entry over the protocol.
    let gateway = Arc::new(ModelGateway::new(config.provider, config.api_base.clone()));
    if let Some(key) = config.api_key.as_deref() {
        gateway.set_credential(key).await;
        info!("Model API credential loaded from the environment.");
    } else if let Some(key) = config::load_stored_credential(&config.credential_path).await {
        gateway.set_credential(&key).await;
        info!(
            "Model API credential restored from {}.",
            config.credential_path.display()
        );
    } else {
        info!("No model API credential found; clients will be asked to provide one.");
    }

    // --- 3. Build the Shared AppState ---
    let app_state = AppState {
        config: config.clone(),
        gateway,
    };

    let cors = CorsLayer::new()
        .allow_origin(config.allowed_origin.clone())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    let api_router = Router::new()
        .route("/profiles", get(list_profiles_handler))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
