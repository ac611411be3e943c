//! Axum router configuration with middleware.
//!
//! Management routes live under `/api/`, trigger routes under `/t/`.
//! Middleware: CORS, tracing.
//!
//! When a web directory is configured (`web_dir` / `HOOKFLOW_WEB_DIR`) and
//! exists, it is served as a SPA: API routes take priority and unknown paths
//! fall through to its `index.html`.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Workflow CRUD
        .route(
            "/workflows",
            post(handlers::workflow::create_workflow).get(handlers::workflow::list_workflows),
        )
        .route(
            "/workflows/{id}",
            get(handlers::workflow::get_workflow)
                .put(handlers::workflow::update_workflow)
                .patch(handlers::workflow::update_workflow)
                .delete(handlers::workflow::delete_workflow),
        )
        // Run history
        .route("/runs/workflow/{workflow_id}", get(handlers::run::list_runs))
        .route("/runs/{id}", get(handlers::run::get_run));

    let web_dir = state.web_dir.clone();

    let mut router = Router::new()
        .nest("/api", api_routes)
        .route("/t/{*path}", post(handlers::trigger::trigger_workflow))
        .route("/health", get(health_check))
        .route("/", get(banner))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if let Some(web_dir) = web_dir.filter(|dir| dir.exists()) {
        let serve_dir =
            ServeDir::new(&web_dir).fallback(ServeFile::new(web_dir.join("index.html")));
        router = router.fallback_service(serve_dir);
        tracing::info!(path = %web_dir.display(), "SPA static file serving enabled");
    }

    router
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET / - Service banner.
async fn banner() -> &'static str {
    concat!("hookflow ", env!("CARGO_PKG_VERSION"), " - POST /t/<path> to trigger a workflow\n")
}
