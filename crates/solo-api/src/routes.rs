//! API routes.

use axum::middleware;
use axum::routing::{get, patch, post, put};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::bids::{list_user_bids, place_bid, update_bid_status};
use crate::handlers::jobs::{
    add_job, delete_job, filter_jobs, get_job, list_all_jobs, list_jobs_by_buyer, update_job,
};
use crate::handlers::session::{issue_token, log_out};
use crate::handlers::{health, ready, root};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, expose_error_details, request_id, request_logging, security_headers,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let session_routes = Router::new()
        .route("/jwt", post(issue_token))
        .route("/logOut", get(log_out));

    let job_routes = Router::new()
        .route("/allJobs", get(list_all_jobs))
        .route("/allJobs/:email", get(list_jobs_by_buyer))
        .route("/allJobsFilter", get(filter_jobs))
        // Misspelled path still used by deployed clients
        .route("/allJbosFilter", get(filter_jobs))
        .route("/job/:id", get(get_job).delete(delete_job))
        .route("/addJob", post(add_job))
        .route("/update/:id", put(update_job));

    let bid_routes = Router::new()
        .route("/bids/:email", get(list_user_bids))
        .route("/bidJob", post(place_bid))
        .route("/bidStatusUpdate/:id", patch(update_bid_status));

    let health_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .merge(session_routes)
        .merge(job_routes)
        .merge(bid_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn_with_state(
            state.config.is_production(),
            expose_error_details,
        ))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
