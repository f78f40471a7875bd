//! SeaORM implementation of AppointmentRepository
//!
//! Every guarded write runs in one transaction: upsert the date's lock row,
//! re-read the row being changed and the date's blocking bookings, run the
//! status and overlap checks, then write. Writers of the same date queue
//! behind the lock row, so the checks always see committed competitors.
//! Header writes are additionally conditioned on the status the caller
//! validated, so a status that moved underneath is never overwritten.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use log::debug;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, NotSet,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::domain::appointment::{
    status_conflict, Appointment, AppointmentDraft, AppointmentRepository, AppointmentStatus,
    BookedSlot, ServiceAssignment,
};
use crate::domain::scheduling::ensure_no_conflict;
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{appointment, appointment_day_lock, appointment_service};

const DAY_FORMAT: &str = "%Y-%m-%d";

pub struct SeaOrmAppointmentRepository {
    db: DatabaseConnection,
}

impl SeaOrmAppointmentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn day_key(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

fn not_found(id: i32) -> DomainError {
    DomainError::NotFound {
        entity: "Appointment",
        field: "id",
        value: id.to_string(),
    }
}

fn model_to_domain(
    m: appointment::Model,
    assignments: Vec<appointment_service::Model>,
) -> DomainResult<Appointment> {
    let status = AppointmentStatus::parse(&m.status).ok_or_else(|| {
        DomainError::Database(format!("appointment {} has unknown status '{}'", m.id, m.status))
    })?;
    let day = NaiveDate::parse_from_str(&m.day, DAY_FORMAT).map_err(|e| {
        DomainError::Database(format!("appointment {} has invalid day '{}': {}", m.id, m.day, e))
    })?;

    Ok(Appointment {
        id: m.id,
        client_id: m.client_id,
        start: m.start_at,
        end: m.end_at,
        duration_minutes: m.duration_minutes,
        day,
        status,
        notes: m.notes,
        services: assignments
            .into_iter()
            .map(|a| ServiceAssignment {
                service_id: a.service_id,
                duration_minutes: a.duration_minutes,
            })
            .collect(),
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

// ── Transaction steps ───────────────────────────────────────────

/// Take the write lock for `day`. The upsert always writes, so a second
/// transaction touching the same date blocks here until the first ends.
async fn lock_day<C: ConnectionTrait>(conn: &C, day: NaiveDate) -> DomainResult<()> {
    let lock = appointment_day_lock::ActiveModel {
        day: Set(day_key(day)),
        locked_at: Set(Utc::now()),
    };
    appointment_day_lock::Entity::insert(lock)
        .on_conflict(
            OnConflict::column(appointment_day_lock::Column::Day)
                .update_column(appointment_day_lock::Column::LockedAt)
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

async fn blocking_on<C: ConnectionTrait>(conn: &C, day: NaiveDate) -> DomainResult<Vec<BookedSlot>> {
    let blocking = [AppointmentStatus::Pending, AppointmentStatus::Confirmed].map(|s| s.as_str());
    let models = appointment::Entity::find()
        .filter(appointment::Column::Day.eq(day_key(day)))
        .filter(appointment::Column::Status.is_in(blocking))
        .order_by_asc(appointment::Column::StartAt)
        .all(conn)
        .await?;
    Ok(models
        .into_iter()
        .map(|m| BookedSlot::new(m.id, m.start_at, m.end_at))
        .collect())
}

/// Reject a blocking draft that collides with a booking other than
/// `exclude`. The draft's date must already be locked.
async fn ensure_free<C: ConnectionTrait>(
    conn: &C,
    draft: &AppointmentDraft,
    exclude: Option<i32>,
) -> DomainResult<()> {
    if draft.status.is_blocking() {
        let booked = blocking_on(conn, draft.day).await?;
        ensure_no_conflict(&draft.range(), &booked, exclude)?;
    }
    Ok(())
}

/// Lock the draft's date, then `ensure_free`.
async fn guard<C: ConnectionTrait>(
    conn: &C,
    draft: &AppointmentDraft,
    exclude: Option<i32>,
) -> DomainResult<()> {
    lock_day(conn, draft.day).await?;
    ensure_free(conn, draft, exclude).await
}

/// Appointment `id` with its assignments, failing when it is missing or its
/// status is no longer `expected`.
async fn load_in<C: ConnectionTrait>(
    conn: &C,
    id: i32,
    expected: AppointmentStatus,
) -> DomainResult<Appointment> {
    let model = appointment::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| not_found(id))?;
    let current = model_to_domain(model, assignments_of(conn, id).await?)?;
    if current.status != expected {
        return Err(status_conflict(id, expected, current.status));
    }
    Ok(current)
}

/// Status currently stored for `id`, used to explain a refused write.
async fn stored_status<C: ConnectionTrait>(conn: &C, id: i32) -> DomainResult<AppointmentStatus> {
    let model = appointment::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(model_to_domain(model, Vec::new())?.status)
}

async fn replace_assignment_rows<C: ConnectionTrait>(
    conn: &C,
    appointment_id: i32,
    services: &[ServiceAssignment],
) -> DomainResult<()> {
    appointment_service::Entity::delete_many()
        .filter(appointment_service::Column::AppointmentId.eq(appointment_id))
        .exec(conn)
        .await?;

    if services.is_empty() {
        return Ok(());
    }
    let rows = services.iter().map(|s| appointment_service::ActiveModel {
        id: NotSet,
        appointment_id: Set(appointment_id),
        service_id: Set(s.service_id),
        duration_minutes: Set(s.duration_minutes),
    });
    appointment_service::Entity::insert_many(rows)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

async fn assignments_of<C: ConnectionTrait>(
    conn: &C,
    appointment_id: i32,
) -> DomainResult<Vec<appointment_service::Model>> {
    Ok(appointment_service::Entity::find()
        .filter(appointment_service::Column::AppointmentId.eq(appointment_id))
        .order_by_asc(appointment_service::Column::Id)
        .all(conn)
        .await?)
}

/// Overwrite header row `id` with the draft's contents, provided its
/// status is still `expected`.
async fn write_header<C: ConnectionTrait>(
    conn: &C,
    id: i32,
    expected: AppointmentStatus,
    draft: &AppointmentDraft,
) -> DomainResult<()> {
    let header = appointment::ActiveModel {
        id: NotSet,
        client_id: Set(draft.client_id),
        start_at: Set(draft.start),
        end_at: Set(draft.end()),
        duration_minutes: Set(draft.duration_minutes()),
        day: Set(day_key(draft.day)),
        status: Set(draft.status.as_str().to_string()),
        notes: Set(draft.notes.clone()),
        created_at: NotSet,
        updated_at: Set(Utc::now()),
    };
    let result = appointment::Entity::update_many()
        .set(header)
        .filter(appointment::Column::Id.eq(id))
        .filter(appointment::Column::Status.eq(expected.as_str()))
        .exec(conn)
        .await?;
    if result.rows_affected == 0 {
        return Err(status_conflict(id, expected, stored_status(conn, id).await?));
    }
    Ok(())
}

// ── AppointmentRepository impl ──────────────────────────────────

#[async_trait]
impl AppointmentRepository for SeaOrmAppointmentRepository {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Appointment>> {
        let Some(model) = appointment::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let assignments = assignments_of(&self.db, id).await?;
        model_to_domain(model, assignments).map(Some)
    }

    async fn find_by_day(&self, day: NaiveDate) -> DomainResult<Vec<Appointment>> {
        let models = appointment::Entity::find()
            .filter(appointment::Column::Day.eq(day_key(day)))
            .order_by_asc(appointment::Column::StartAt)
            .all(&self.db)
            .await?;
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let mut grouped: HashMap<i32, Vec<appointment_service::Model>> = HashMap::new();
        for row in appointment_service::Entity::find()
            .filter(appointment_service::Column::AppointmentId.is_in(ids))
            .order_by_asc(appointment_service::Column::Id)
            .all(&self.db)
            .await?
        {
            grouped.entry(row.appointment_id).or_default().push(row);
        }

        models
            .into_iter()
            .map(|m| {
                let rows = grouped.remove(&m.id).unwrap_or_default();
                model_to_domain(m, rows)
            })
            .collect()
    }

    async fn list_blocking(&self, day: NaiveDate) -> DomainResult<Vec<BookedSlot>> {
        blocking_on(&self.db, day).await
    }

    async fn create(&self, draft: AppointmentDraft) -> DomainResult<Appointment> {
        debug!("Creating appointment for client {} at {}", draft.client_id, draft.start);

        let txn = self.db.begin().await?;
        guard(&txn, &draft, None).await?;

        let now = Utc::now();
        let header = appointment::ActiveModel {
            id: NotSet,
            client_id: Set(draft.client_id),
            start_at: Set(draft.start),
            end_at: Set(draft.end()),
            duration_minutes: Set(draft.duration_minutes()),
            day: Set(day_key(draft.day)),
            status: Set(draft.status.as_str().to_string()),
            notes: Set(draft.notes.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;
        replace_assignment_rows(&txn, header.id, &draft.services).await?;
        txn.commit().await?;

        Ok(draft.into_appointment(header.id, now))
    }

    async fn update(
        &self,
        id: i32,
        expected: AppointmentStatus,
        draft: AppointmentDraft,
    ) -> DomainResult<Appointment> {
        debug!("Updating appointment {} (expected status {})", id, expected);

        let txn = self.db.begin().await?;
        lock_day(&txn, draft.day).await?;
        let current = load_in(&txn, id, expected).await?;
        if current.day != draft.day {
            lock_day(&txn, current.day).await?;
        }
        ensure_free(&txn, &draft, Some(id)).await?;

        write_header(&txn, id, expected, &draft).await?;
        replace_assignment_rows(&txn, id, &draft.services).await?;
        txn.commit().await?;

        Ok(draft.into_appointment(id, current.created_at))
    }

    async fn replace_assignments(
        &self,
        id: i32,
        services: Vec<ServiceAssignment>,
    ) -> DomainResult<Appointment> {
        debug!("Replacing services of appointment: {}", id);

        let day = self.find_by_id(id).await?.ok_or_else(|| not_found(id))?.day;

        let txn = self.db.begin().await?;
        lock_day(&txn, day).await?;
        let existing = appointment::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| not_found(id))?;
        let current = model_to_domain(existing, Vec::new())?;
        if current.day != day {
            lock_day(&txn, current.day).await?;
        }
        let draft = AppointmentDraft {
            client_id: current.client_id,
            start: current.start,
            day: current.day,
            status: current.status,
            notes: current.notes,
            services,
        };
        ensure_free(&txn, &draft, Some(id)).await?;

        write_header(&txn, id, current.status, &draft).await?;
        replace_assignment_rows(&txn, id, &draft.services).await?;
        txn.commit().await?;

        Ok(draft.into_appointment(id, current.created_at))
    }

    async fn set_status(
        &self,
        id: i32,
        expected: AppointmentStatus,
        next: AppointmentStatus,
    ) -> DomainResult<Appointment> {
        debug!("Setting appointment {} status from {} to {}", id, expected, next);

        // the date is read first so the transaction opens with its lock write
        let day = self.find_by_id(id).await?.ok_or_else(|| not_found(id))?.day;

        let txn = self.db.begin().await?;
        lock_day(&txn, day).await?;
        let mut current = load_in(&txn, id, expected).await?;
        if current.day != day {
            lock_day(&txn, current.day).await?;
        }
        if next.is_blocking() {
            let booked = blocking_on(&txn, current.day).await?;
            ensure_no_conflict(&current.range(), &booked, Some(id))?;
        }

        let now = Utc::now();
        let result = appointment::Entity::update_many()
            .col_expr(appointment::Column::Status, Expr::value(next.as_str()))
            .col_expr(appointment::Column::UpdatedAt, Expr::value(now))
            .filter(appointment::Column::Id.eq(id))
            .filter(appointment::Column::Status.eq(expected.as_str()))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(status_conflict(id, expected, stored_status(&txn, id).await?));
        }
        txn.commit().await?;

        current.status = next;
        current.updated_at = now;
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::{file_test_database, remove_test_file, test_database};
    use crate::infrastructure::database::SeaOrmRepositoryProvider;
    use crate::domain::{RepositoryProvider, Service};
    use chrono::{DateTime, TimeZone};
    use std::sync::Arc;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 7).unwrap()
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 7, h, m, 0).unwrap()
    }

    fn draft(service_id: i32, h: u32, m: u32, minutes: i32) -> AppointmentDraft {
        AppointmentDraft {
            client_id: 1,
            start: at(h, m),
            day: day(),
            status: AppointmentStatus::Pending,
            notes: String::new(),
            services: vec![ServiceAssignment {
                service_id,
                duration_minutes: minutes,
            }],
        }
    }

    async fn setup() -> (SeaOrmRepositoryProvider, i32) {
        let repos = SeaOrmRepositoryProvider::new(test_database().await);
        let service = repos
            .services()
            .save(Service::new(0, "Corte", 30))
            .await
            .unwrap();
        (repos, service.id)
    }

    #[tokio::test]
    async fn create_persists_header_and_assignments() {
        let (repos, sid) = setup().await;
        let created = repos.appointments().create(draft(sid, 10, 0, 45)).await.unwrap();

        let loaded = repos.appointments().find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(loaded.end, at(10, 45));
        assert_eq!(loaded.duration_minutes, 45);
        assert_eq!(loaded.services, created.services);
        assert_eq!(loaded.day, day());
    }

    #[tokio::test]
    async fn overlapping_create_is_rejected_and_not_written() {
        let (repos, sid) = setup().await;
        let first = repos.appointments().create(draft(sid, 10, 0, 60)).await.unwrap();

        let err = repos.appointments().create(draft(sid, 10, 30, 30)).await.unwrap_err();
        assert!(matches!(err, DomainError::Overlap { appointment_id, .. } if appointment_id == first.id));
        assert_eq!(repos.appointments().find_by_day(day()).await.unwrap().len(), 1);

        repos.appointments().create(draft(sid, 11, 0, 30)).await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_creates_on_same_day_admit_one() {
        let (repos, sid) = setup().await;
        let repos = Arc::new(repos);

        let a = {
            let repos = repos.clone();
            tokio::spawn(async move { repos.appointments().create(draft(sid, 10, 0, 30)).await })
        };
        let b = {
            let repos = repos.clone();
            tokio::spawn(async move { repos.appointments().create(draft(sid, 10, 0, 30)).await })
        };
        let results = [a.await.unwrap(), b.await.unwrap()];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(repos.appointments().list_blocking(day()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_replaces_assignments_and_excludes_itself() {
        let (repos, sid) = setup().await;
        let created = repos.appointments().create(draft(sid, 10, 0, 30)).await.unwrap();

        let mut moved = draft(sid, 10, 15, 30);
        moved.services.push(ServiceAssignment {
            service_id: sid,
            duration_minutes: 15,
        });
        let updated = repos
            .appointments()
            .update(created.id, AppointmentStatus::Pending, moved)
            .await
            .unwrap();
        assert_eq!(updated.end, at(11, 0));

        let loaded = repos.appointments().find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(loaded.services.len(), 2);
        assert_eq!(loaded.created_at, created.created_at);
    }

    #[tokio::test]
    async fn replace_assignments_is_guarded() {
        let (repos, sid) = setup().await;
        let a = repos.appointments().create(draft(sid, 10, 0, 30)).await.unwrap();
        repos.appointments().create(draft(sid, 10, 30, 30)).await.unwrap();

        let err = repos
            .appointments()
            .replace_assignments(
                a.id,
                vec![ServiceAssignment {
                    service_id: sid,
                    duration_minutes: 60,
                }],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Overlap { .. }));

        let loaded = repos.appointments().find_by_id(a.id).await.unwrap().unwrap();
        assert_eq!(loaded.duration_minutes, 30);
        assert_eq!(loaded.services.len(), 1);
    }

    #[tokio::test]
    async fn cancelled_rows_leave_the_blocking_list() {
        let (repos, sid) = setup().await;
        let a = repos.appointments().create(draft(sid, 10, 0, 30)).await.unwrap();
        repos
            .appointments()
            .set_status(a.id, AppointmentStatus::Pending, AppointmentStatus::Cancelled)
            .await
            .unwrap();

        assert!(repos.appointments().list_blocking(day()).await.unwrap().is_empty());
        let all = repos.appointments().find_by_day(day()).await.unwrap();
        assert_eq!(all[0].status, AppointmentStatus::Cancelled);
        assert_eq!(all[0].services.len(), 1);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let (repos, sid) = setup().await;
        assert!(repos.appointments().find_by_id(9).await.unwrap().is_none());
        let err = repos
            .appointments()
            .update(9, AppointmentStatus::Pending, draft(sid, 10, 0, 30))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
        let err = repos
            .appointments()
            .set_status(9, AppointmentStatus::Pending, AppointmentStatus::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn stale_confirm_cannot_revive_cancelled_booking() {
        let (repos, sid) = setup().await;
        let a = repos.appointments().create(draft(sid, 10, 0, 30)).await.unwrap();
        repos
            .appointments()
            .set_status(a.id, AppointmentStatus::Pending, AppointmentStatus::Cancelled)
            .await
            .unwrap();
        let b = repos.appointments().create(draft(sid, 10, 0, 30)).await.unwrap();

        // a confirm validated while `a` was still pending
        let err = repos
            .appointments()
            .set_status(a.id, AppointmentStatus::Pending, AppointmentStatus::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let blocking = repos.appointments().list_blocking(day()).await.unwrap();
        assert_eq!(blocking.len(), 1);
        assert_eq!(blocking[0].id, b.id);
        let stored = repos.appointments().find_by_id(a.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AppointmentStatus::Cancelled);
    }

    #[tokio::test]
    async fn reviving_into_a_taken_window_is_an_overlap() {
        let (repos, sid) = setup().await;
        let a = repos.appointments().create(draft(sid, 10, 0, 30)).await.unwrap();
        repos
            .appointments()
            .set_status(a.id, AppointmentStatus::Pending, AppointmentStatus::Cancelled)
            .await
            .unwrap();
        let b = repos.appointments().create(draft(sid, 10, 0, 30)).await.unwrap();

        let err = repos
            .appointments()
            .set_status(a.id, AppointmentStatus::Cancelled, AppointmentStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Overlap { appointment_id, .. } if appointment_id == b.id));
    }

    #[tokio::test]
    async fn update_with_stale_status_writes_nothing() {
        let (repos, sid) = setup().await;
        let a = repos.appointments().create(draft(sid, 10, 0, 30)).await.unwrap();
        repos
            .appointments()
            .set_status(a.id, AppointmentStatus::Pending, AppointmentStatus::Cancelled)
            .await
            .unwrap();

        let err = repos
            .appointments()
            .update(a.id, AppointmentStatus::Pending, draft(sid, 14, 0, 30))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let stored = repos.appointments().find_by_id(a.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AppointmentStatus::Cancelled);
        assert_eq!(stored.start, at(10, 0));
    }

    #[tokio::test]
    async fn pooled_file_database_admits_one_of_many_concurrent_creates() {
        let (db, path) = file_test_database(5).await;
        let repos = Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
        let sid = repos
            .services()
            .save(Service::new(0, "Corte", 30))
            .await
            .unwrap()
            .id;

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let repos = repos.clone();
                tokio::spawn(async move { repos.appointments().create(draft(sid, 10, 0, 30)).await })
            })
            .collect();
        let mut results = Vec::new();
        for task in tasks {
            results.push(task.await.unwrap());
        }
        let blocking = repos.appointments().list_blocking(day()).await.unwrap();
        db.close().await.unwrap();
        remove_test_file(&path);

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(matches!(err, DomainError::Overlap { .. }), "unexpected error: {}", err);
        }
        assert_eq!(blocking.len(), 1);
    }
}
