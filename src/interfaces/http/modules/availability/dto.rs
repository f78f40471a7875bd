//! Availability DTOs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::SlotList;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AvailabilityQuery {
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    /// Comma separated service ids, e.g. `1,4`
    pub service_ids: String,
}

impl AvailabilityQuery {
    pub fn parse_date(&self) -> Result<NaiveDate, String> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD", self.date))
    }

    pub fn parse_service_ids(&self) -> Result<Vec<i32>, String> {
        self.service_ids
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<i32>()
                    .map_err(|_| format!("invalid service id '{}'", s))
            })
            .collect()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailabilityDto {
    pub date: String,
    /// Combined duration of the requested services
    pub duration_minutes: i32,
    /// Bookable start times, `HH:MM`, ascending
    pub slots: Vec<String>,
    /// Why no slots are offered, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<SlotList> for AvailabilityDto {
    fn from(list: SlotList) -> Self {
        Self {
            date: list.date.format("%Y-%m-%d").to_string(),
            duration_minutes: list.duration_minutes,
            slots: list.formatted(),
            message: list.message,
        }
    }
}
