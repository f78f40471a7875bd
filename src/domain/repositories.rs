//! Repository provider for the domain layer

use super::appointment::AppointmentRepository;
use super::calendar::CalendarConfigRepository;
use super::catalog::ServiceRepository;

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let calendar = repos.calendar().get().await?;
///     let busy = repos.appointments().list_blocking(day).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn calendar(&self) -> &dyn CalendarConfigRepository;
    fn services(&self) -> &dyn ServiceRepository;
    fn appointments(&self) -> &dyn AppointmentRepository;
}
