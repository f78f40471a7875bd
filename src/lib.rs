//! # Salon booking service
//!
//! Appointment booking backend for a salon: a single business calendar, a
//! catalog of services and overlap-safe scheduling of appointments.
//!
//! ## Architecture
//!
//! - **domain**: calendar, catalog and appointment aggregates, repository
//!   traits and the pure slot/overlap core
//! - **application**: availability queries and the appointment scheduler
//! - **infrastructure**: SeaORM persistence and in-memory repositories
//! - **interfaces**: REST API with Swagger documentation
//! - **shared**: errors, retry and shutdown helpers

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod shared;

pub use config::{default_config_path, AppConfig, ConfigError};

pub use infrastructure::{
    init_database, run_migrations, DatabaseConfig, InMemoryRepositoryProvider, SeaOrmRepositoryProvider,
};

pub use interfaces::http::{create_api_router, ApiState};
