use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use shared_config::AppConfig;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/transition", post(handlers::transition_appointment))
        .route("/actions/{status}", get(handlers::get_available_actions))
        .route("/calendar", post(handlers::get_calendar))
        .route("/search", post(handlers::search_appointments))
        .route("/patient-split", post(handlers::split_patient_appointments))
        .with_state(state)
}
