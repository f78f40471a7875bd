//! Appointment booking use cases
//!
//! Create and update run the full validation chain before anything is
//! written. The final overlap check happens inside the store's write
//! transaction, so two overlapping requests can never both commit.
//! Updates and status changes hand the store the status they were
//! validated against, and the store refuses the write if it has moved.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{info, warn};

use super::{describe_overlap, ensure_services_offered, system_clock, Clock};
use crate::domain::appointment::assignments_duration;
use crate::domain::{
    Appointment, AppointmentDraft, AppointmentStatus, BusinessCalendar, DomainError, DomainResult,
    RepositoryProvider, ServiceAssignment, StockConsumptionHook,
};
use crate::shared::{retry_with_backoff, RetryConfig};

/// Input for booking a new appointment.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub client_id: i32,
    pub start: DateTime<Utc>,
    pub service_ids: Vec<i32>,
    pub notes: Option<String>,
}

/// Partial update of an existing appointment. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct AppointmentChanges {
    pub start: Option<DateTime<Utc>>,
    pub service_ids: Option<Vec<i32>>,
    pub notes: Option<String>,
    pub status: Option<AppointmentStatus>,
}

impl AppointmentChanges {
    fn touches_schedule(&self) -> bool {
        self.start.is_some() || self.service_ids.is_some()
    }
}

/// Validated placement of an appointment on the calendar.
struct Placement {
    day: NaiveDate,
    services: Vec<ServiceAssignment>,
}

pub struct AppointmentScheduler {
    repos: Arc<dyn RepositoryProvider>,
    stock_hook: Arc<dyn StockConsumptionHook>,
    retry: RetryConfig,
    clock: Clock,
}

impl AppointmentScheduler {
    pub fn new(repos: Arc<dyn RepositoryProvider>, stock_hook: Arc<dyn StockConsumptionHook>) -> Self {
        Self {
            repos,
            stock_hook,
            retry: RetryConfig::default(),
            clock: system_clock(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Book a new `pending` appointment.
    pub async fn create(&self, request: BookingRequest) -> DomainResult<Appointment> {
        let result = self.try_create(request).await;
        record_outcome("create", &result);
        result
    }

    async fn try_create(&self, request: BookingRequest) -> DomainResult<Appointment> {
        if request.start < (self.clock)() {
            return Err(DomainError::validation("cannot book an appointment in the past"));
        }

        let calendar = self.repos.calendar().get().await?;
        let placement = self
            .place(&calendar, request.start, &request.service_ids, None)
            .await?;

        let draft = AppointmentDraft {
            client_id: request.client_id,
            start: request.start,
            day: placement.day,
            status: AppointmentStatus::Pending,
            notes: request.notes.unwrap_or_default(),
            services: placement.services,
        };

        let appointment = retry_with_backoff(
            self.retry.clone(),
            || self.repos.appointments().create(draft.clone()),
            DomainError::is_transient,
            "create_appointment",
        )
        .await
        .map_err(|e| describe_overlap(e, &calendar))?;

        info!(
            appointment_id = appointment.id,
            client_id = appointment.client_id,
            start = %appointment.start,
            duration_minutes = appointment.duration_minutes,
            "Appointment booked"
        );

        self.consume_stock(&appointment).await;
        Ok(appointment)
    }

    /// Reschedule, change services, edit notes or move the status of an
    /// appointment.
    ///
    /// A start time or service change re-runs the calendar validation (the
    /// past check excepted) and the overlap guard, excluding the appointment
    /// itself. Services already on the appointment keep their duration
    /// snapshot.
    pub async fn update(&self, id: i32, changes: AppointmentChanges) -> DomainResult<Appointment> {
        let result = self.try_update(id, changes).await;
        record_outcome("update", &result);
        result
    }

    async fn try_update(&self, id: i32, changes: AppointmentChanges) -> DomainResult<Appointment> {
        let existing = self.load(id).await?;
        if existing.status.is_terminal() {
            return Err(DomainError::validation(format!(
                "appointment {} is {} and can no longer be modified",
                id, existing.status
            )));
        }

        let status = match changes.status {
            Some(next) => existing.status.transition_to(next)?,
            None => existing.status,
        };
        let notes = changes.notes.clone().unwrap_or_else(|| existing.notes.clone());

        if !changes.touches_schedule() {
            let draft = AppointmentDraft {
                client_id: existing.client_id,
                start: existing.start,
                day: existing.day,
                status,
                notes,
                services: existing.services.clone(),
            };
            return retry_with_backoff(
                self.retry.clone(),
                || self.repos.appointments().update(id, existing.status, draft.clone()),
                DomainError::is_transient,
                "update_appointment",
            )
            .await;
        }

        let calendar = self.repos.calendar().get().await?;
        let start = changes.start.unwrap_or(existing.start);
        let service_ids = changes
            .service_ids
            .clone()
            .unwrap_or_else(|| existing.service_ids());
        let placement = self
            .place(&calendar, start, &service_ids, Some(&existing))
            .await?;
        let services_changed = placement.services != existing.services;

        let draft = AppointmentDraft {
            client_id: existing.client_id,
            start,
            day: placement.day,
            status,
            notes,
            services: placement.services,
        };

        let appointment = retry_with_backoff(
            self.retry.clone(),
            || self.repos.appointments().update(id, existing.status, draft.clone()),
            DomainError::is_transient,
            "update_appointment",
        )
        .await
        .map_err(|e| describe_overlap(e, &calendar))?;

        info!(
            appointment_id = id,
            start = %appointment.start,
            duration_minutes = appointment.duration_minutes,
            status = %appointment.status,
            "Appointment updated"
        );

        if services_changed {
            self.consume_stock(&appointment).await;
        }
        Ok(appointment)
    }

    /// Move an appointment to `next`, enforcing the transition rules.
    ///
    /// The store only applies the change while the appointment still has
    /// the status the rules were checked against.
    pub async fn transition(&self, id: i32, next: AppointmentStatus) -> DomainResult<Appointment> {
        let result = self.try_transition(id, next).await;
        record_outcome("transition", &result);
        result
    }

    async fn try_transition(&self, id: i32, next: AppointmentStatus) -> DomainResult<Appointment> {
        let appointment = self.load(id).await?;
        let previous = appointment.status;
        if previous.transition_to(next)? == previous {
            return Ok(appointment);
        }

        let appointment = retry_with_backoff(
            self.retry.clone(),
            || self.repos.appointments().set_status(id, previous, next),
            DomainError::is_transient,
            "set_appointment_status",
        )
        .await?;
        info!(appointment_id = id, from = %previous, to = %appointment.status, "Appointment status changed");
        Ok(appointment)
    }

    pub async fn confirm(&self, id: i32) -> DomainResult<Appointment> {
        self.transition(id, AppointmentStatus::Confirmed).await
    }

    pub async fn cancel(&self, id: i32) -> DomainResult<Appointment> {
        self.transition(id, AppointmentStatus::Cancelled).await
    }

    pub async fn complete(&self, id: i32) -> DomainResult<Appointment> {
        self.transition(id, AppointmentStatus::Completed).await
    }

    async fn load(&self, id: i32) -> DomainResult<Appointment> {
        self.repos
            .appointments()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity: "Appointment",
                field: "id",
                value: id.to_string(),
            })
    }

    /// Calendar and catalog checks shared by create and update.
    async fn place(
        &self,
        calendar: &BusinessCalendar,
        start: DateTime<Utc>,
        service_ids: &[i32],
        existing: Option<&Appointment>,
    ) -> DomainResult<Placement> {
        let local_start = calendar.to_local(start);
        let day = local_start.date();

        if !calendar.is_open_on(day) {
            return Err(calendar.closed_day_error(day));
        }
        if local_start.time() < calendar.opening_time {
            return Err(DomainError::validation(format!(
                "the appointment starts before opening time {}",
                calendar.opening_time.format("%H:%M")
            )));
        }

        if service_ids.is_empty() {
            return Err(DomainError::validation("at least one service is required"));
        }
        let catalog = self.repos.services().get_by_ids(service_ids).await?;
        ensure_services_offered(&catalog, day)?;

        let services: Vec<ServiceAssignment> = catalog
            .iter()
            .map(|s| ServiceAssignment::snapshot(s, existing.and_then(|a| a.snapshot_for(s.id))))
            .collect();

        let total = assignments_duration(&services);
        if total <= 0 {
            return Err(DomainError::validation(
                "total duration of the requested services must be greater than zero",
            ));
        }

        let local_end = calendar.to_local(start + Duration::minutes(total as i64));
        if local_end.date() != day || local_end.time() > calendar.closing_time {
            return Err(DomainError::validation(format!(
                "the appointment would end at {}, after closing time {}",
                local_end.format("%H:%M"),
                calendar.closing_time.format("%H:%M")
            )));
        }

        Ok(Placement { day, services })
    }

    async fn consume_stock(&self, appointment: &Appointment) {
        if let Err(e) = self.stock_hook.consume(appointment).await {
            warn!(appointment_id = appointment.id, error = %e, "Stock consumption failed");
        }
    }
}

/// Rejections (bad input, unknown ids, taken windows) and failures
/// (missing calendar, storage) are counted apart, labelled by error kind.
fn record_outcome<T>(operation: &'static str, result: &DomainResult<T>) {
    match result {
        Ok(_) if operation == "create" => {
            metrics::counter!("appointments_created_total").increment(1);
        }
        Ok(_) => {}
        Err(e) if e.is_rejection() => {
            metrics::counter!("appointments_rejected_total", "operation" => operation, "reason" => e.kind())
                .increment(1);
        }
        Err(e) => {
            warn!(operation, error = %e, "Appointment operation failed");
            metrics::counter!("appointments_failed_total", "operation" => operation, "kind" => e.kind())
                .increment(1);
        }
    }
}
