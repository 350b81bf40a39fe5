use std::sync::Arc;

use axum::{routing::post, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn analytics_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/time-series", post(handlers::get_time_series))
        .route("/breakdown", post(handlers::get_breakdown))
        .route("/reports/{period}", post(handlers::get_period_report))
        .route("/reports/{period}/export", post(handlers::export_period_report))
        .with_state(state)
}
