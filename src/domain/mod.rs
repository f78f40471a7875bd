//! Domain layer: calendar, catalog and appointment aggregates plus the
//! pure scheduling core.

pub mod appointment;
pub mod calendar;
pub mod catalog;
pub mod repositories;
pub mod scheduling;
pub mod stock;

pub use appointment::{Appointment, AppointmentDraft, AppointmentStatus, BookedSlot, ServiceAssignment};
pub use calendar::{BusinessCalendar, WeekdaySet};
pub use catalog::Service;
pub use repositories::RepositoryProvider;
pub use stock::StockConsumptionHook;

pub use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
