use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::datetime::{local_now, resolve_now};
use shared_models::error::AppError;
use shared_models::RecordId;

use crate::models::{BookingWeekQuery, SlotError, SlotQueryRequest};
use crate::services::AvailabilityService;

impl From<SlotError> for AppError {
    fn from(err: SlotError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

#[axum::debug_handler]
pub async fn get_doctor_slots(
    State(config): State<Arc<AppConfig>>,
    Path(doctor_id): Path<String>,
    Json(request): Json<SlotQueryRequest>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = doctor_id
        .parse::<RecordId>()
        .map_err(|_| AppError::BadRequest("Invalid doctor id".to_string()))?;
    let now = resolve_now(request.now.as_deref())?;
    let availability = AvailabilityService::new(&config);

    let slots = availability.slots_for_doctor(
        &doctor_id,
        request.date,
        now,
        &request.appointments,
        &request.booked_times,
    )?;
    let available = slots.iter().filter(|slot| slot.available).count();

    debug!("Doctor {} has {} of {} slots open on {}", doctor_id, available, slots.len(), request.date);

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "date": request.date,
        "slots": slots,
        "available_count": available,
    })))
}

#[axum::debug_handler]
pub async fn get_booking_week(
    State(config): State<Arc<AppConfig>>,
    Query(query): Query<BookingWeekQuery>,
) -> Result<Json<Value>, AppError> {
    let today = query.from.unwrap_or_else(|| local_now().date());
    let days = query.days.unwrap_or(config.booking_week_days);
    if days == 0 || days > 31 {
        return Err(AppError::BadRequest(format!("days must be between 1 and 31, got {}", days)));
    }

    let availability = AvailabilityService::new(&config);
    let week = availability.booking_week(today, days);

    Ok(Json(json!({ "days": week })))
}
