use std::{path::Path, sync::Arc};

use cms_frontend::{
    ApiClient, AppState, AuthService, AuthState, ContentState, PageRenderer,
    PublicContentService,
    config::{AppConfig, Env},
    create_router,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: configuration, logging, backend client, templates, HTTP server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Configuration (fail fast on an unusable environment)
    dotenv::dotenv().ok();
    let config = AppConfig::load()?;

    // 2. Logging: RUST_LOG wins, otherwise development defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cms_frontend=debug,tower_http=info".into());

    // 3. Pretty output locally, JSON for log aggregation in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Frontend starting in {:?} mode", config.env);

    // 4. Backend client, shared by the content facade and the auth service.
    let client = ApiClient::new(&config.api_base_url)?;
    tracing::info!(api = %client.base_url(), "backend API configured");

    let content = Arc::new(PublicContentService::new(client.clone())) as ContentState;
    let auth = Arc::new(AuthService::new(client)) as AuthState;

    // 5. Templates
    let renderer = Arc::new(PageRenderer::new(Path::new(&config.templates_dir))?);

    // 6. Unified State Assembly
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState {
        content,
        auth,
        renderer,
        config,
    });

    // 7. Server Startup
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on {bind_addr}");
    tracing::info!("API Documentation (Swagger UI) available at: http://{bind_addr}/swagger-ui");

    axum::serve(listener, app).await?;
    Ok(())
}
