//! In-memory repositories for development and testing
//!
//! Same contracts as the SeaORM repositories. The appointment table sits
//! behind an async mutex so the overlap check and the write it guards
//! happen as one step.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock};

use crate::domain::appointment::{
    status_conflict, Appointment, AppointmentDraft, AppointmentRepository, AppointmentStatus,
    BookedSlot, ServiceAssignment,
};
use crate::domain::calendar::{BusinessCalendar, CalendarConfigRepository};
use crate::domain::catalog::{Service, ServiceRepository};
use crate::domain::scheduling::ensure_no_conflict;
use crate::domain::{DomainError, DomainResult, RepositoryProvider};

// ── Calendar ────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryCalendarRepository {
    calendar: RwLock<Option<BusinessCalendar>>,
}

#[async_trait]
impl CalendarConfigRepository for InMemoryCalendarRepository {
    async fn find(&self) -> DomainResult<Option<BusinessCalendar>> {
        Ok(self.calendar.read().await.clone())
    }

    async fn save(&self, calendar: BusinessCalendar) -> DomainResult<()> {
        calendar.validate()?;
        *self.calendar.write().await = Some(calendar);
        Ok(())
    }
}

// ── Services ────────────────────────────────────────────────────

pub struct InMemoryServiceRepository {
    services: DashMap<i32, Service>,
    counter: AtomicI32,
}

impl Default for InMemoryServiceRepository {
    fn default() -> Self {
        Self {
            services: DashMap::new(),
            counter: AtomicI32::new(1),
        }
    }
}

#[async_trait]
impl ServiceRepository for InMemoryServiceRepository {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Service>> {
        Ok(self.services.get(&id).map(|s| s.clone()))
    }

    async fn find_all(&self) -> DomainResult<Vec<Service>> {
        let mut all: Vec<Service> = self.services.iter().map(|e| e.value().clone()).collect();
        all.sort_by_key(|s| s.id);
        Ok(all)
    }

    async fn find_by_ids(&self, ids: &[i32]) -> DomainResult<Vec<Service>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.services.get(id).map(|s| s.clone()))
            .collect())
    }

    async fn save(&self, mut service: Service) -> DomainResult<Service> {
        service.id = self.counter.fetch_add(1, Ordering::SeqCst);
        self.services.insert(service.id, service.clone());
        Ok(service)
    }

    async fn update(&self, service: Service) -> DomainResult<()> {
        match self.services.get_mut(&service.id) {
            Some(mut existing) => {
                *existing = service;
                Ok(())
            }
            None => Err(DomainError::NotFound {
                entity: "Service",
                field: "id",
                value: service.id.to_string(),
            }),
        }
    }
}

// ── Appointments ────────────────────────────────────────────────

#[derive(Default)]
struct AppointmentTable {
    rows: BTreeMap<i32, Appointment>,
    last_id: i32,
}

impl AppointmentTable {
    fn blocking_on(&self, day: NaiveDate) -> Vec<BookedSlot> {
        let mut slots: Vec<BookedSlot> = self
            .rows
            .values()
            .filter(|a| a.day == day && a.blocks_calendar())
            .map(BookedSlot::from)
            .collect();
        slots.sort_by_key(|s| s.range.start);
        slots
    }

    fn guard(&self, draft: &AppointmentDraft, exclude: Option<i32>) -> DomainResult<()> {
        if draft.status.is_blocking() {
            ensure_no_conflict(&draft.range(), &self.blocking_on(draft.day), exclude)?;
        }
        Ok(())
    }

    fn get(&self, id: i32) -> DomainResult<&Appointment> {
        self.rows.get(&id).ok_or_else(|| not_found(id))
    }

    /// Row `id`, provided its status is still `expected`.
    fn get_in(&self, id: i32, expected: AppointmentStatus) -> DomainResult<&Appointment> {
        let row = self.get(id)?;
        if row.status != expected {
            return Err(status_conflict(id, expected, row.status));
        }
        Ok(row)
    }
}

fn not_found(id: i32) -> DomainError {
    DomainError::NotFound {
        entity: "Appointment",
        field: "id",
        value: id.to_string(),
    }
}

#[derive(Default)]
pub struct InMemoryAppointmentRepository {
    table: Mutex<AppointmentTable>,
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointmentRepository {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Appointment>> {
        Ok(self.table.lock().await.rows.get(&id).cloned())
    }

    async fn find_by_day(&self, day: NaiveDate) -> DomainResult<Vec<Appointment>> {
        let table = self.table.lock().await;
        let mut list: Vec<Appointment> = table
            .rows
            .values()
            .filter(|a| a.day == day)
            .cloned()
            .collect();
        list.sort_by_key(|a| a.start);
        Ok(list)
    }

    async fn list_blocking(&self, day: NaiveDate) -> DomainResult<Vec<BookedSlot>> {
        Ok(self.table.lock().await.blocking_on(day))
    }

    async fn create(&self, draft: AppointmentDraft) -> DomainResult<Appointment> {
        let mut table = self.table.lock().await;
        table.guard(&draft, None)?;

        table.last_id += 1;
        let appointment = draft.into_appointment(table.last_id, Utc::now());
        table.rows.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn update(
        &self,
        id: i32,
        expected: AppointmentStatus,
        draft: AppointmentDraft,
    ) -> DomainResult<Appointment> {
        let mut table = self.table.lock().await;
        let created_at = table.get_in(id, expected)?.created_at;
        table.guard(&draft, Some(id))?;

        let appointment = draft.into_appointment(id, created_at);
        table.rows.insert(id, appointment.clone());
        Ok(appointment)
    }

    async fn replace_assignments(
        &self,
        id: i32,
        services: Vec<ServiceAssignment>,
    ) -> DomainResult<Appointment> {
        let mut table = self.table.lock().await;
        let existing = table.get(id)?;
        let draft = AppointmentDraft {
            client_id: existing.client_id,
            start: existing.start,
            day: existing.day,
            status: existing.status,
            notes: existing.notes.clone(),
            services,
        };
        let created_at = existing.created_at;
        table.guard(&draft, Some(id))?;

        let appointment = draft.into_appointment(id, created_at);
        table.rows.insert(id, appointment.clone());
        Ok(appointment)
    }

    async fn set_status(
        &self,
        id: i32,
        expected: AppointmentStatus,
        next: AppointmentStatus,
    ) -> DomainResult<Appointment> {
        let mut table = self.table.lock().await;
        let row = table.get_in(id, expected)?;
        if next.is_blocking() {
            ensure_no_conflict(&row.range(), &table.blocking_on(row.day), Some(id))?;
        }

        let row = table.rows.get_mut(&id).ok_or_else(|| not_found(id))?;
        row.status = next;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }
}

// ── Provider ────────────────────────────────────────────────────

/// Repository provider holding everything in process memory.
#[derive(Default)]
pub struct InMemoryRepositoryProvider {
    calendar: InMemoryCalendarRepository,
    services: InMemoryServiceRepository,
    appointments: InMemoryAppointmentRepository,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn calendar(&self) -> &dyn CalendarConfigRepository {
        &self.calendar
    }

    fn services(&self) -> &dyn ServiceRepository {
        &self.services
    }

    fn appointments(&self) -> &dyn AppointmentRepository {
        &self.appointments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 7, h, m, 0).unwrap()
    }

    fn draft(h: u32, m: u32, minutes: i32) -> AppointmentDraft {
        AppointmentDraft {
            client_id: 1,
            start: at(h, m),
            day: NaiveDate::from_ymd_opt(2030, 1, 7).unwrap(),
            status: AppointmentStatus::Pending,
            notes: String::new(),
            services: vec![ServiceAssignment {
                service_id: 1,
                duration_minutes: minutes,
            }],
        }
    }

    #[tokio::test]
    async fn calendar_missing_is_configuration_error() {
        let repo = InMemoryCalendarRepository::default();
        assert!(matches!(repo.get().await, Err(DomainError::Configuration(_))));
    }

    #[tokio::test]
    async fn get_by_ids_preserves_order_and_reports_missing() {
        let repo = InMemoryServiceRepository::default();
        let a = repo.save(Service::new(0, "Corte", 30)).await.unwrap();
        let b = repo.save(Service::new(0, "Color", 90)).await.unwrap();

        let found = repo.get_by_ids(&[b.id, a.id]).await.unwrap();
        assert_eq!(found.iter().map(|s| s.id).collect::<Vec<_>>(), vec![b.id, a.id]);

        let err = repo.get_by_ids(&[a.id, 99]).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { value, .. } if value == "99"));
    }

    #[tokio::test]
    async fn create_rejects_overlapping_booking() {
        let repo = InMemoryAppointmentRepository::default();
        let first = repo.create(draft(10, 0, 60)).await.unwrap();

        let err = repo.create(draft(10, 30, 30)).await.unwrap_err();
        assert!(matches!(err, DomainError::Overlap { appointment_id, .. } if appointment_id == first.id));

        // touching is fine
        repo.create(draft(11, 0, 30)).await.unwrap();
    }

    #[tokio::test]
    async fn cancelled_booking_frees_the_slot() {
        let repo = InMemoryAppointmentRepository::default();
        let first = repo.create(draft(10, 0, 60)).await.unwrap();
        repo.set_status(first.id, AppointmentStatus::Pending, AppointmentStatus::Cancelled)
            .await
            .unwrap();

        assert!(repo.list_blocking(first.day).await.unwrap().is_empty());
        repo.create(draft(10, 0, 60)).await.unwrap();
        assert_eq!(repo.find_by_day(first.day).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_excludes_itself_from_overlap() {
        let repo = InMemoryAppointmentRepository::default();
        let a = repo.create(draft(10, 0, 60)).await.unwrap();
        let moved = repo
            .update(a.id, AppointmentStatus::Pending, draft(10, 30, 60))
            .await
            .unwrap();
        assert_eq!(moved.start, at(10, 30));
        assert_eq!(moved.created_at, a.created_at);
    }

    #[tokio::test]
    async fn replace_assignments_recomputes_end() {
        let repo = InMemoryAppointmentRepository::default();
        let a = repo.create(draft(10, 0, 30)).await.unwrap();
        repo.create(draft(11, 0, 30)).await.unwrap();

        let longer = vec![
            ServiceAssignment {
                service_id: 1,
                duration_minutes: 30,
            },
            ServiceAssignment {
                service_id: 2,
                duration_minutes: 30,
            },
        ];
        let updated = repo.replace_assignments(a.id, longer).await.unwrap();
        assert_eq!(updated.duration_minutes, 60);
        assert_eq!(updated.end, at(11, 0));

        let too_long = vec![ServiceAssignment {
            service_id: 3,
            duration_minutes: 90,
        }];
        let err = repo.replace_assignments(a.id, too_long).await.unwrap_err();
        assert!(matches!(err, DomainError::Overlap { .. }));
        // the failed replacement left the appointment untouched
        let stored = repo.find_by_id(a.id).await.unwrap().unwrap();
        assert_eq!(stored.duration_minutes, 60);
    }

    #[tokio::test]
    async fn set_status_on_unknown_id_is_not_found() {
        let repo = InMemoryAppointmentRepository::default();
        let err = repo
            .set_status(42, AppointmentStatus::Pending, AppointmentStatus::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Appointment", .. }));
    }

    #[tokio::test]
    async fn stale_confirm_cannot_revive_cancelled_booking() {
        let repo = InMemoryAppointmentRepository::default();
        let a = repo.create(draft(10, 0, 60)).await.unwrap();
        repo.set_status(a.id, AppointmentStatus::Pending, AppointmentStatus::Cancelled)
            .await
            .unwrap();
        let b = repo.create(draft(10, 0, 60)).await.unwrap();

        // a confirm that read `a` while it was still pending
        let err = repo
            .set_status(a.id, AppointmentStatus::Pending, AppointmentStatus::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref msg) if msg.contains("now cancelled")));

        let blocking = repo.list_blocking(a.day).await.unwrap();
        assert_eq!(blocking.iter().map(|s| s.id).collect::<Vec<_>>(), vec![b.id]);
    }

    #[tokio::test]
    async fn update_with_stale_status_writes_nothing() {
        let repo = InMemoryAppointmentRepository::default();
        let a = repo.create(draft(10, 0, 60)).await.unwrap();
        repo.set_status(a.id, AppointmentStatus::Pending, AppointmentStatus::Cancelled)
            .await
            .unwrap();

        let mut revived = draft(11, 0, 30);
        revived.status = AppointmentStatus::Confirmed;
        let err = repo.update(a.id, AppointmentStatus::Pending, revived).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let stored = repo.find_by_id(a.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AppointmentStatus::Cancelled);
        assert_eq!(stored.start, at(10, 0));
    }

    #[tokio::test]
    async fn reviving_into_taken_window_is_overlap() {
        let repo = InMemoryAppointmentRepository::default();
        let a = repo.create(draft(10, 0, 60)).await.unwrap();
        repo.set_status(a.id, AppointmentStatus::Pending, AppointmentStatus::Cancelled)
            .await
            .unwrap();
        repo.create(draft(10, 30, 30)).await.unwrap();

        // no lifecycle rule allows this, the store still refuses to double-book
        let err = repo
            .set_status(a.id, AppointmentStatus::Cancelled, AppointmentStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Overlap { .. }));
    }
}
