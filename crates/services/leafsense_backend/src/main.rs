// File: crates/services/leafsense_backend/src/main.rs
use axum::{routing::get, Router};
use leafsense_common::logging;
use leafsense_config::load_config;
use leafsense_sync::{routes as sync_routes, spawn_sweep};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

mod service_factory;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    logging::init();
    let config = load_config()?;

    let (sync_state, synchronizer) = service_factory::build_sync_state(&config).await;

    let sweep_secs = config
        .sync
        .as_ref()
        .and_then(|s| s.sweep_interval_secs)
        .unwrap_or(0);
    if let (Some(synchronizer), true) = (synchronizer, sweep_secs > 0) {
        spawn_sweep(synchronizer, Duration::from_secs(sweep_secs));
    }

    let api_router = Router::new()
        .route("/", get(|| async { "Welcome to LeafSense API!" }))
        .merge(sync_routes(Arc::new(sync_state)));

    #[allow(unused_mut)] // mutated only with the openapi feature
    let mut app = Router::new().nest("/api", api_router);

    #[cfg(feature = "openapi")]
    {
        use leafsense_sync::doc::SyncApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "LeafSense API",
                version = "0.1.0",
                description = "LeafSense booking sync service",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            servers( (url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(SyncApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");
        app = app.merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc));
    }

    let app = app.layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
