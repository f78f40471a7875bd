//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod appointment_repository;
pub mod calendar_repository;
pub mod repository_provider;
pub mod service_repository;

pub use repository_provider::SeaOrmRepositoryProvider;
