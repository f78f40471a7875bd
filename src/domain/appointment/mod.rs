//! Appointment aggregate
//!
//! Contains the Appointment entity, its service assignments, and the
//! repository interface.

pub mod model;
pub mod repository;

pub use model::{
    assignments_duration, status_conflict, Appointment, AppointmentDraft, AppointmentStatus, BookedSlot,
    ServiceAssignment,
};
pub use repository::AppointmentRepository;
