use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use shared_config::AppConfig;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/booking-week", get(handlers::get_booking_week))
        .route("/{doctor_id}/slots", post(handlers::get_doctor_slots))
        .with_state(state)
}
