//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_business_calendar;
mod m20240101_000002_create_services;
mod m20240101_000003_create_appointments;
mod m20240101_000004_create_appointment_services;
mod m20240101_000005_create_appointment_day_locks;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_business_calendar::Migration),
            Box::new(m20240101_000002_create_services::Migration),
            Box::new(m20240101_000003_create_appointments::Migration),
            Box::new(m20240101_000004_create_appointment_services::Migration),
            Box::new(m20240101_000005_create_appointment_day_locks::Migration),
        ]
    }
}
