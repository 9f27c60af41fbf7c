use axum::http::HeaderValue;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod db;
mod state;

use sectorx_backend::civil::RecordNormalizer;
use sectorx_backend::config::{self, ServerConfig};
use state::AppState;

/// Build the CORS layer; an empty origin list allows any origin / 构建跨域层
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    if server.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin {}: {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sectorx_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration / 加载配置
    config::init_config().map_err(anyhow::Error::msg)?;
    let app_config = config::config();
    tracing::info!("Server will listen on {}:{}", app_config.server.host, app_config.server.port);

    // Connect document store / 连接文档存储
    let store = db::connect(&app_config).await?;
    tracing::info!("Document store connected");

    if let Some(dir) = app_config.import_dir() {
        let imported = db::import_documents(&store, &dir).await?;
        tracing::info!("Imported {} document(s) from {:?}", imported, dir);
    }

    let state = Arc::new(AppState::new(Arc::new(store), RecordNormalizer::default(), &app_config));
    tracing::info!(
        "Searching {} collection(s), timeout {:?}, {} in flight",
        app_config.search.collections.len(),
        app_config.search_timeout(),
        app_config.search.max_concurrency
    );

    let app = api::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&app_config.server));

    let bind_addr = app_config.get_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
