//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::appointment::AppointmentRepository;
use crate::domain::calendar::CalendarConfigRepository;
use crate::domain::catalog::ServiceRepository;
use crate::domain::repositories::RepositoryProvider;

use super::appointment_repository::SeaOrmAppointmentRepository;
use super::calendar_repository::SeaOrmCalendarRepository;
use super::service_repository::SeaOrmServiceRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let calendar = repos.calendar().get().await?;
/// let booked = repos.appointments().list_blocking(date).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    calendar: SeaOrmCalendarRepository,
    services: SeaOrmServiceRepository,
    appointments: SeaOrmAppointmentRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            calendar: SeaOrmCalendarRepository::new(db.clone()),
            services: SeaOrmServiceRepository::new(db.clone()),
            appointments: SeaOrmAppointmentRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
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
