// libs/appointment-cell/src/services/lifecycle.rs
use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::models::{
    Appointment, AppointmentAction, AppointmentError, AppointmentStatus,
    NewAppointmentRequest, RescheduleOutcome,
};

/// Guarded status changes. Every status mutation in the workspace goes through
/// [`AppointmentLifecycleService::transition`].
#[derive(Debug, Default, Clone, Copy)]
pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Validate that a status transition is allowed
    pub fn validate_status_transition(
        &self,
        current_status: &AppointmentStatus,
        action: AppointmentAction,
    ) -> Result<(), AppointmentError> {
        debug!("Validating {} from {}", action, current_status);

        let valid_transitions = self.get_valid_transitions(current_status);

        if !valid_transitions.contains(&action.target_status()) {
            warn!("Invalid status transition attempted: {} while {}", action, current_status);
            return Err(AppointmentError::InvalidTransition {
                action,
                status: *current_status,
            });
        }

        Ok(())
    }

    /// Get all valid next statuses for a given current status
    pub fn get_valid_transitions(&self, current_status: &AppointmentStatus) -> Vec<AppointmentStatus> {
        match current_status {
            AppointmentStatus::Scheduled => vec![
                AppointmentStatus::InProgress,
                AppointmentStatus::Completed,
                AppointmentStatus::Cancelled,
            ],
            // In-progress encounters are closed out by the backend, not here
            AppointmentStatus::InProgress => vec![],
            // Terminal states - no transitions allowed
            AppointmentStatus::Completed => vec![],
            AppointmentStatus::Cancelled => vec![],
            // Nothing is known about where an unrecognized record stands
            AppointmentStatus::Unrecognized => vec![],
        }
    }

    /// Actions a UI should offer for an appointment in `status`.
    pub fn available_actions(&self, status: &AppointmentStatus) -> Vec<AppointmentAction> {
        [
            AppointmentAction::Start,
            AppointmentAction::Complete,
            AppointmentAction::Reschedule,
            AppointmentAction::Cancel,
        ]
        .into_iter()
        .filter(|action| self.validate_status_transition(status, *action).is_ok())
        .collect()
    }

    /// The single guarded transition. Returns a new value; the input is untouched.
    pub fn transition(
        &self,
        appointment: &Appointment,
        action: AppointmentAction,
    ) -> Result<Appointment, AppointmentError> {
        self.validate_status_transition(&appointment.status, action)?;

        let mut updated = appointment.clone();
        updated.status = action.target_status();

        info!(
            "Appointment {} transitioned: {} -> {}",
            appointment.id, appointment.status, updated.status
        );
        Ok(updated)
    }

    pub fn start(&self, appointment: &Appointment) -> Result<Appointment, AppointmentError> {
        self.transition(appointment, AppointmentAction::Start)
    }

    pub fn complete(&self, appointment: &Appointment) -> Result<Appointment, AppointmentError> {
        self.transition(appointment, AppointmentAction::Complete)
    }

    pub fn cancel(&self, appointment: &Appointment) -> Result<Appointment, AppointmentError> {
        self.transition(appointment, AppointmentAction::Cancel)
    }

    /// Cancel-and-recreate: the original is cancelled and a fresh booking request
    /// carries the new time.
    pub fn reschedule(
        &self,
        appointment: &Appointment,
        new_time: NaiveDateTime,
    ) -> Result<RescheduleOutcome, AppointmentError> {
        let cancelled = self.transition(appointment, AppointmentAction::Reschedule)?;

        let replacement = NewAppointmentRequest {
            patient_id: appointment.patient_id.clone(),
            doctor_id: appointment.doctor_id.clone(),
            scheduled_at: new_time,
            status: AppointmentStatus::Scheduled,
            priority: appointment.priority,
            reason: appointment.reason.clone(),
            notes: appointment.notes.clone(),
            rescheduled_from: appointment.id.clone(),
        };

        debug!("Appointment {} rescheduled to {}", appointment.id, new_time);
        Ok(RescheduleOutcome { cancelled, replacement })
    }
}
