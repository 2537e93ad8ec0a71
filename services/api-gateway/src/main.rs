use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::get,
    serve, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tendersheet_store::{AnalyticsStore, BidderDirectory, TrackingService};
use tendersheet_templates::TemplateGenerator;
use tendersheet_utils::{init_logging, AppConfig, ParseCache, ProgressTracker, TenderParser};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

mod handlers;
mod metrics;
mod middleware;
mod routes;

use handlers::{health_check, metrics_handler};
use metrics::Metrics;
use middleware::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration, using defaults: {}", e);
        AppConfig::default()
    });

    // Initialize logging
    init_logging(&config.logging)?;
    info!("Starting Tendersheet API Gateway");

    let state = AppState::from_config(config)?;
    let addr: SocketAddr = format!("{}:{}", state.config.server.host, state.config.server.port)
        .parse()
        .context("Invalid server address")?;

    // Build application router
    let app = create_app(state);

    // Start server
    let listener = TcpListener::bind(&addr).await?;
    info!("API Gateway listening on {}", addr);

    serve(listener, app).await?;

    Ok(())
}

pub fn create_app(state: AppState) -> Router {
    let max_request_size = state.config.server.max_request_size;

    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))

        // Tender routes
        .merge(routes::create_tender_routes())
        .nest("/api/bidders", routes::create_bidder_routes())

        // Middleware stack
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([Method::GET, Method::POST])
                        .allow_headers([header::CONTENT_TYPE]),
                )
                .layer(DefaultBodyLimit::max(max_request_size))
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(axum::middleware::from_fn(error_handling_middleware)),
        )

        // Application state
        .with_state(state)
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub parser: Arc<TenderParser>,
    pub cache: Arc<ParseCache>,
    pub tracking: TrackingService,
    pub bidders: Arc<BidderDirectory>,
    pub generator: Arc<TemplateGenerator>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let storage = &config.storage;
        std::fs::create_dir_all(&storage.upload_dir)
            .with_context(|| format!("Cannot create upload dir {}", storage.upload_dir.display()))?;
        std::fs::create_dir_all(&storage.output_dir)
            .with_context(|| format!("Cannot create output dir {}", storage.output_dir.display()))?;

        let tracking = TrackingService::new(
            ProgressTracker::new(),
            AnalyticsStore::load(&storage.analytics_path),
        );
        let parser = TenderParser::new(&config.parser).with_progress(tracking.progress_tracker().clone());
        let bidders = BidderDirectory::load(&storage.bidder_database_path);
        let generator = TemplateGenerator::new(storage.illustration_path.clone());
        let metrics = Metrics::new().context("Failed to register metrics")?;

        info!(
            upload_dir = %storage.upload_dir.display(),
            output_dir = %storage.output_dir.display(),
            bidders = bidders.len(),
            "Application state ready"
        );

        Ok(Self {
            cache: Arc::new(ParseCache::new(config.parser.cache_capacity)),
            parser: Arc::new(parser),
            tracking,
            bidders: Arc::new(bidders),
            generator: Arc::new(generator),
            metrics,
            config: Arc::new(config),
        })
    }
}

#[cfg(test)]
mod tests;
