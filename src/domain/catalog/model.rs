//! Service catalog entity

use chrono::{DateTime, Utc, Weekday};

use crate::domain::calendar::WeekdaySet;

/// Duration assumed for a service whose stored duration is zero or negative.
pub const FALLBACK_DURATION_MINUTES: i32 = 30;

/// A bookable service (haircut, colouring, manicure...)
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub id: i32,
    pub name: String,
    /// Stored duration in minutes; see [`Service::effective_duration`]
    pub duration_minutes: i32,
    pub enabled: bool,
    /// Weekdays on which the service is offered
    pub offered_weekdays: WeekdaySet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Service {
    pub fn new(id: i32, name: impl Into<String>, duration_minutes: i32) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            duration_minutes,
            enabled: true,
            offered_weekdays: WeekdaySet::all(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Duration used for scheduling. Non-positive stored durations fall back
    /// to [`FALLBACK_DURATION_MINUTES`].
    pub fn effective_duration(&self) -> i32 {
        if self.duration_minutes > 0 {
            self.duration_minutes
        } else {
            FALLBACK_DURATION_MINUTES
        }
    }

    /// Whether the service can be booked on the given weekday.
    pub fn is_offered_on(&self, day: Weekday) -> bool {
        self.enabled && self.offered_weekdays.contains(day)
    }
}

/// Combined effective duration of a service list, in minutes.
pub fn total_duration(services: &[Service]) -> i32 {
    services.iter().map(Service::effective_duration).sum()
}
