use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use shared_config::AppConfig;
use shared_models::datetime::{parse_reference_datetime, resolve_now};
use shared_models::error::AppError;
use shared_models::RecordId;

use crate::models::{
    Appointment, AppointmentAction, AppointmentError, AppointmentStatus, CalendarError,
    CalendarRequest, SearchRequest, TransitionRequest, TransitionResponse,
};
use crate::services::{
    AppointmentLifecycleService, AppointmentSearchService, CalendarService, MonthCursor,
};

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::InvalidTransition { .. } => AppError::Conflict(err.to_string()),
            AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
        }
    }
}

impl From<CalendarError> for AppError {
    fn from(err: CalendarError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct PatientSplitRequest {
    pub patient_id: RecordId,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
}

// ==============================================================================
// LIFECYCLE HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn transition_appointment(
    State(_config): State<Arc<AppConfig>>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<Value>, AppError> {
    let lifecycle = AppointmentLifecycleService::new();

    let (appointment, replacement) = match request.action {
        AppointmentAction::Reschedule => {
            let raw = request.new_time.as_deref().ok_or_else(|| {
                AppointmentError::ValidationError("new_time is required to reschedule".to_string())
            })?;
            let new_time = parse_reference_datetime(raw).ok_or_else(|| {
                AppointmentError::ValidationError(format!("new_time {:?} is not a valid date-time", raw))
            })?;
            let outcome = lifecycle.reschedule(&request.appointment, new_time)?;
            (outcome.cancelled, Some(outcome.replacement))
        }
        action => (lifecycle.transition(&request.appointment, action)?, None),
    };

    info!("Applied {} to appointment {}", request.action, appointment.id);

    let response = TransitionResponse {
        available_actions: lifecycle.available_actions(&appointment.status),
        appointment,
        replacement,
    };

    Ok(Json(json!(response)))
}

#[axum::debug_handler]
pub async fn get_available_actions(
    State(_config): State<Arc<AppConfig>>,
    Path(status): Path<AppointmentStatus>,
) -> Result<Json<Value>, AppError> {
    let lifecycle = AppointmentLifecycleService::new();

    Ok(Json(json!({
        "status": status,
        "terminal": status.is_terminal(),
        "actions": lifecycle.available_actions(&status),
    })))
}

// ==============================================================================
// CALENDAR & SEARCH HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_calendar(
    State(_config): State<Arc<AppConfig>>,
    Json(request): Json<CalendarRequest>,
) -> Result<Json<Value>, AppError> {
    let now = resolve_now(request.now.as_deref())?;
    let month = MonthCursor::new(request.year, request.month)?;
    let calendar = CalendarService::new();

    let grid = calendar.build_month_grid(month, now.date(), request.selected, &request.appointments);
    let selected_day = request
        .selected
        .map(|date| calendar.appointments_on(date, &request.appointments));

    Ok(Json(json!({
        "grid": grid,
        "selected_appointments": selected_day,
        "previous": month.previous(),
        "next": month.next(),
    })))
}

#[axum::debug_handler]
pub async fn search_appointments(
    State(_config): State<Arc<AppConfig>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Value>, AppError> {
    let search = AppointmentSearchService::new();

    let appointments = search.filter_appointments(
        &request.filter,
        &request.appointments,
        &request.patients,
        &request.doctors,
    );

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn split_patient_appointments(
    State(_config): State<Arc<AppConfig>>,
    Json(request): Json<PatientSplitRequest>,
) -> Result<Json<Value>, AppError> {
    let search = AppointmentSearchService::new();
    let split = search.split_for_patient(&request.patient_id, &request.appointments);

    Ok(Json(json!(split)))
}
