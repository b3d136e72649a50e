use std::net::SocketAddr;
use std::sync::Arc;

use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rust_leads_api::api;
use rust_leads_api::catalog::CategoryCatalog;
use rust_leads_api::config::Config;
use rust_leads_api::enrichment::LeadPipeline;
use rust_leads_api::handlers::AppState;
use rust_leads_api::services::GooglePlacesService;

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - The category catalog and the places API client.
/// - HTTP routes and middleware (CORS, Rate Limiting).
///
/// It then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_leads_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Catalog is validated once and never mutated afterwards
    let catalog = Arc::new(CategoryCatalog::builtin()?);
    tracing::info!(
        "Category catalog loaded: {} categories",
        catalog.categories().count()
    );

    let places = Arc::new(GooglePlacesService::new(&config)?);
    tracing::info!("✓ Places client initialized: {}", config.places_base_url);

    let pipeline = LeadPipeline::new(catalog, places.clone(), places)
        .with_max_pages_per_query(config.max_pages_per_query);
    if config.max_pages_per_query.is_none() {
        tracing::info!("Pagination is unbounded (PLACES_MAX_PAGES not set)");
    }

    // Build application state
    let app_state = Arc::new(AppState { pipeline });

    // Configure rate limiter: 2 requests/second per IP, burst of 5.
    // A single run already fans out into dozens of upstream calls.
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(2)
            .burst_size(5)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );

    let app = api::router(app_state).layer(ServiceBuilder::new().layer(GovernorLayer {
        config: governor_conf,
    }));

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
