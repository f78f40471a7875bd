//! Calendar configuration repository interface

use async_trait::async_trait;

use super::model::BusinessCalendar;
use crate::domain::{DomainError, DomainResult};

#[async_trait]
pub trait CalendarConfigRepository: Send + Sync {
    /// Load the calendar, if one has been configured
    async fn find(&self) -> DomainResult<Option<BusinessCalendar>>;

    /// Create or replace the calendar
    async fn save(&self, calendar: BusinessCalendar) -> DomainResult<()>;

    /// Load the calendar, failing with a configuration error when absent.
    async fn get(&self) -> DomainResult<BusinessCalendar> {
        self.find().await?.ok_or_else(DomainError::calendar_missing)
    }
}
