//! Calendar DTOs

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{BusinessCalendar, WeekdaySet};

#[derive(Debug, Serialize, ToSchema)]
pub struct CalendarDto {
    /// `HH:MM`
    pub opening_time: String,
    /// `HH:MM`
    pub closing_time: String,
    /// Lowercase English weekday names, Monday first
    pub open_weekdays: Vec<String>,
    pub step_minutes: i32,
    pub timezone: String,
}

impl From<BusinessCalendar> for CalendarDto {
    fn from(c: BusinessCalendar) -> Self {
        Self {
            opening_time: c.opening_time.format("%H:%M").to_string(),
            closing_time: c.closing_time.format("%H:%M").to_string(),
            open_weekdays: c.open_weekdays.names(),
            step_minutes: c.step_minutes,
            timezone: c.timezone.name().to_string(),
        }
    }
}

/// Full replacement of the calendar. Weekday names may be English or
/// Spanish, with or without accents.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateCalendarRequest {
    pub opening_time: String,
    pub closing_time: String,
    pub open_weekdays: Vec<String>,
    #[validate(range(min = 1, max = 1440))]
    pub step_minutes: i32,
    /// IANA timezone, e.g. `America/Argentina/Buenos_Aires`
    pub timezone: String,
}

fn parse_time(field: &str, value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value.trim(), "%H:%M:%S"))
        .map_err(|_| format!("{} '{}' is not a valid HH:MM time", field, value))
}

impl UpdateCalendarRequest {
    pub fn into_calendar(self) -> Result<BusinessCalendar, String> {
        let timezone: Tz = self
            .timezone
            .trim()
            .parse()
            .map_err(|_| format!("unknown timezone '{}'", self.timezone))?;
        let open_weekdays = WeekdaySet::from_names(&self.open_weekdays).map_err(|e| match e {
            crate::domain::DomainError::Validation(msg) => msg,
            other => other.to_string(),
        })?;

        Ok(BusinessCalendar {
            opening_time: parse_time("opening_time", &self.opening_time)?,
            closing_time: parse_time("closing_time", &self.closing_time)?,
            open_weekdays,
            step_minutes: self.step_minutes,
            timezone,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn request() -> UpdateCalendarRequest {
        UpdateCalendarRequest {
            opening_time: "09:00".into(),
            closing_time: "18:00".into(),
            open_weekdays: vec!["lunes".into(), "Miércoles".into(), "friday".into()],
            step_minutes: 30,
            timezone: "America/Argentina/Buenos_Aires".into(),
        }
    }

    #[test]
    fn mixed_language_weekdays_are_accepted() {
        let calendar = request().into_calendar().unwrap();
        assert!(calendar.open_weekdays.contains(Weekday::Wed));
        assert!(!calendar.open_weekdays.contains(Weekday::Tue));
        assert_eq!(CalendarDto::from(calendar).open_weekdays, vec!["monday", "wednesday", "friday"]);
    }

    #[test]
    fn bad_time_and_timezone_are_reported() {
        let mut bad = request();
        bad.opening_time = "9am".into();
        assert!(bad.into_calendar().unwrap_err().contains("opening_time"));

        let mut bad = request();
        bad.timezone = "Mars/Olympus".into();
        assert!(bad.into_calendar().unwrap_err().contains("timezone"));
    }
}
