//! HTTP API modules, one per resource

pub mod appointments;
pub mod availability;
pub mod calendar;
pub mod health;
pub mod metrics;
pub mod request_id;
pub mod services;
