//! Stock consumption port
//!
//! Services may consume products (dye, shampoo...). After an appointment is
//! persisted the scheduler notifies this hook; failures are reported with
//! [`DomainError::Stock`](crate::domain::DomainError::Stock) and never undo
//! the appointment.

use async_trait::async_trait;

use crate::domain::appointment::Appointment;
use crate::domain::DomainResult;

#[async_trait]
pub trait StockConsumptionHook: Send + Sync {
    async fn consume(&self, appointment: &Appointment) -> DomainResult<()>;
}
