//! Service catalog aggregate

pub mod model;
pub mod repository;

pub use model::{total_duration, Service, FALLBACK_DURATION_MINUTES};
pub use repository::ServiceRepository;
