//! Stock consumption hook implementations

use async_trait::async_trait;
use tracing::info;

use crate::domain::{Appointment, DomainResult, StockConsumptionHook};

/// Records which services would draw from stock. Product recipes and the
/// stock ledger live outside this service.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingStockHook;

#[async_trait]
impl StockConsumptionHook for LoggingStockHook {
    async fn consume(&self, appointment: &Appointment) -> DomainResult<()> {
        info!(
            appointment_id = appointment.id,
            services = ?appointment.service_ids(),
            "Stock consumption requested"
        );
        Ok(())
    }
}
