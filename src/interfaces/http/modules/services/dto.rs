//! Service catalog DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::Service;

#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceDto {
    pub id: i32,
    pub name: String,
    /// Stored duration
    pub duration_minutes: i32,
    /// Duration used for scheduling (stored value or the 30 minute fallback)
    pub effective_duration_minutes: i32,
    pub enabled: bool,
    pub offered_weekdays: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Service> for ServiceDto {
    fn from(s: Service) -> Self {
        Self {
            id: s.id,
            effective_duration_minutes: s.effective_duration(),
            name: s.name,
            duration_minutes: s.duration_minutes,
            enabled: s.enabled,
            offered_weekdays: s.offered_weekdays.names(),
            created_at: s.created_at.to_rfc3339(),
            updated_at: s.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateServiceRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(range(min = 0, max = 1440))]
    pub duration_minutes: i32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Defaults to every day of the week
    pub offered_weekdays: Option<Vec<String>>,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateServiceRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(range(min = 0, max = 1440))]
    pub duration_minutes: Option<i32>,
    pub enabled: Option<bool>,
    pub offered_weekdays: Option<Vec<String>>,
}
