//! Appointment DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::Appointment;

#[derive(Debug, Serialize, ToSchema)]
pub struct AppointmentServiceDto {
    pub service_id: i32,
    /// Duration recorded when the service was assigned
    pub duration_minutes: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AppointmentDto {
    pub id: i32,
    pub client_id: i32,
    pub start: String,
    pub end: String,
    /// Business-local calendar date
    pub day: String,
    pub duration_minutes: i32,
    pub status: String,
    pub notes: String,
    pub services: Vec<AppointmentServiceDto>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Appointment> for AppointmentDto {
    fn from(a: Appointment) -> Self {
        Self {
            id: a.id,
            client_id: a.client_id,
            start: a.start.to_rfc3339(),
            end: a.end.to_rfc3339(),
            day: a.day.format("%Y-%m-%d").to_string(),
            duration_minutes: a.duration_minutes,
            status: a.status.to_string(),
            notes: a.notes,
            services: a
                .services
                .into_iter()
                .map(|s| AppointmentServiceDto {
                    service_id: s.service_id,
                    duration_minutes: s.duration_minutes,
                })
                .collect(),
            created_at: a.created_at.to_rfc3339(),
            updated_at: a.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateAppointmentRequest {
    #[validate(range(min = 1))]
    pub client_id: i32,
    /// Start instant, RFC 3339 (e.g. `2030-01-07T10:00:00-03:00`)
    pub start: String,
    #[validate(length(min = 1, message = "at least one service is required"))]
    pub service_ids: Vec<i32>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Every field is optional; omitted fields keep their stored value.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateAppointmentRequest {
    pub start: Option<String>,
    #[validate(length(min = 1, message = "at least one service is required"))]
    pub service_ids: Option<Vec<i32>>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    /// pending, confirmed, completed or cancelled
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AgendaQuery {
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
}

pub fn parse_start(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid start '{}': {}", value, e))
}
