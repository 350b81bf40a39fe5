use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::datetime::resolve_now;
use shared_models::error::AppError;

use crate::models::{AnalyticsError, BreakdownRequest, ReportPeriod, ReportRequest, TimeSeriesRequest};
use crate::services::{render_csv, CategoricalAggregator, PeriodReportService, TimeBucketAggregator};

/// Longest trailing daily window a caller may ask for.
const MAX_DAILY_DAYS: u32 = 366;

impl From<AnalyticsError> for AppError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::InvalidBucketRange(_) => AppError::BadRequest(err.to_string()),
        }
    }
}

#[axum::debug_handler]
pub async fn get_time_series(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<TimeSeriesRequest>,
) -> Result<Json<Value>, AppError> {
    let now = resolve_now(request.now.as_deref())?;
    let daily_days = request.daily_days.unwrap_or(config.daily_window_days);
    if daily_days > MAX_DAILY_DAYS {
        return Err(AppError::BadRequest(format!(
            "daily_days must be at most {}, got {}",
            MAX_DAILY_DAYS, daily_days
        )));
    }

    let aggregator = TimeBucketAggregator::new(config.consultation_fee);
    let report = aggregator.time_series(
        now,
        (config.hourly_start_hour, config.hourly_end_hour),
        daily_days,
        &request.appointments,
    )?;

    debug!("Time series over {} records, {} invalid", request.appointments.len(), report.invalid_records);

    Ok(Json(json!(report)))
}

#[axum::debug_handler]
pub async fn get_breakdown(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<BreakdownRequest>,
) -> Result<Json<Value>, AppError> {
    let now = resolve_now(request.now.as_deref())?;
    let aggregator = CategoricalAggregator::new(config.consultation_fee);

    let breakdown = aggregator.breakdown(now, &request.appointments, &request.patients, &request.doctors);

    Ok(Json(json!(breakdown)))
}

#[axum::debug_handler]
pub async fn get_period_report(
    State(config): State<Arc<AppConfig>>,
    Path(period): Path<ReportPeriod>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<Value>, AppError> {
    let now = resolve_now(request.now.as_deref())?;
    let reports = PeriodReportService::new(config.consultation_fee);

    Ok(Json(json!(reports.report(period, now, &request.appointments))))
}

#[axum::debug_handler]
pub async fn export_period_report(
    State(config): State<Arc<AppConfig>>,
    Path(period): Path<ReportPeriod>,
    Json(request): Json<ReportRequest>,
) -> Result<impl IntoResponse, AppError> {
    let now = resolve_now(request.now.as_deref())?;
    let report = PeriodReportService::new(config.consultation_fee).report(period, now, &request.appointments);

    let disposition = format!("attachment; filename=\"{}-report-{}.csv\"", period, report.start.format("%Y-%m-%d"));
    debug!("Exporting {} report as CSV", period);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        render_csv(&report),
    ))
}
