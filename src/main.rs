use axum::{routing::get, Router};
use cycle_count_reconciler::{api, create_pool, AppConfig, ReconciliationService};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    let pool = create_pool(&config.database).await?;
    info!("Database pool created");

    let service = Arc::new(ReconciliationService::new(
        pool,
        config.reconciliation.clone(),
    ));

    let reconciliation_routes = Router::new()
        .route(
            "/api/reconciliation/opportunities",
            get(api::list_opportunities).post(api::reconcile_records),
        )
        .route("/api/reconciliation/report", get(api::consolidated_report))
        .route(
            "/api/reconciliation/report/:item_id",
            get(api::opportunity_report),
        )
        .route("/api/warehouses", get(api::list_warehouses))
        .with_state(service);

    let app = Router::new()
        .route("/health", get(api::health_check))
        .merge(reconciliation_routes)
        .layer(ServiceBuilder::new());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET  /api/reconciliation/opportunities      - ranked opportunities from the store");
    info!("  POST /api/reconciliation/opportunities      - ranked opportunities for posted records");
    info!("  GET  /api/reconciliation/report             - consolidated CSV report");
    info!("  GET  /api/reconciliation/report/:item_id    - single item transfer plan");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
