//! Database entities module

pub mod appointment;
pub mod appointment_day_lock;
pub mod appointment_service;
pub mod business_calendar;
pub mod service;

pub use appointment::Entity as Appointment;
pub use appointment_day_lock::Entity as AppointmentDayLock;
pub use appointment_service::Entity as AppointmentService;
pub use business_calendar::Entity as BusinessCalendar;
pub use service::Entity as Service;
