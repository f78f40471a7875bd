//! Appointment repository interface

use async_trait::async_trait;
use chrono::NaiveDate;

use super::model::{Appointment, AppointmentDraft, AppointmentStatus, BookedSlot, ServiceAssignment};
use crate::domain::DomainResult;

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Find appointment by ID, with its service assignments
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Appointment>>;

    /// All appointments of a calendar date (any status), ordered by start
    async fn find_by_day(&self, day: NaiveDate) -> DomainResult<Vec<Appointment>>;

    /// Pending/confirmed bookings of a calendar date, ordered by start
    async fn list_blocking(&self, day: NaiveDate) -> DomainResult<Vec<BookedSlot>>;

    /// Insert header and assignments atomically.
    ///
    /// A blocking draft is checked against the day's blocking bookings in
    /// the same transaction; a collision fails with `DomainError::Overlap`
    /// and nothing is written.
    async fn create(&self, draft: AppointmentDraft) -> DomainResult<Appointment>;

    /// Rewrite header fields and replace the assignment collection
    /// atomically, with the same overlap guard as `create` (the appointment
    /// itself excluded).
    ///
    /// `expected` is the status the caller validated against. When the
    /// stored status differs at write time nothing is written and the call
    /// fails with `status_conflict`.
    async fn update(
        &self,
        id: i32,
        expected: AppointmentStatus,
        draft: AppointmentDraft,
    ) -> DomainResult<Appointment>;

    /// Replace the service assignments and recompute the derived duration
    /// and end, overlap-guarded.
    async fn replace_assignments(
        &self,
        id: i32,
        services: Vec<ServiceAssignment>,
    ) -> DomainResult<Appointment>;

    /// Move the status from `expected` to `next` without touching the
    /// schedule, as one guarded step.
    ///
    /// Fails with `status_conflict` when the stored status is no longer
    /// `expected`. A blocking `next` is overlap-checked like `update`.
    async fn set_status(
        &self,
        id: i32,
        expected: AppointmentStatus,
        next: AppointmentStatus,
    ) -> DomainResult<Appointment>;
}
