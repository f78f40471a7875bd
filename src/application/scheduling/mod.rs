//! Scheduling use cases: slot queries and appointment booking.

pub mod availability;
pub mod scheduler;

use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::domain::calendar::weekday_name;
use crate::domain::{BusinessCalendar, DomainError, DomainResult, Service};

pub use availability::{AvailabilityService, SlotList};
pub use scheduler::{AppointmentChanges, AppointmentScheduler, BookingRequest};

/// Source of "now". Injected so tests can pin the current instant.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// Fail when a service is disabled or not offered on `day`'s weekday.
pub(crate) fn ensure_services_offered(services: &[Service], day: NaiveDate) -> DomainResult<()> {
    let weekday = day.weekday();
    match services.iter().find(|s| !s.is_offered_on(weekday)) {
        Some(s) if !s.enabled => Err(DomainError::validation(format!(
            "service '{}' is currently disabled",
            s.name
        ))),
        Some(s) => Err(DomainError::validation(format!(
            "service '{}' is not offered on {}",
            s.name,
            weekday_name(weekday)
        ))),
        None => Ok(()),
    }
}

/// Turn a store-side overlap into the user-facing validation error, naming
/// the conflicting window in business-local time.
pub(crate) fn describe_overlap(err: DomainError, calendar: &BusinessCalendar) -> DomainError {
    match err {
        DomainError::Overlap { start, end, .. } => DomainError::validation(format!(
            "the requested time overlaps an existing appointment from {} to {}",
            calendar.to_local(start).format("%H:%M"),
            calendar.to_local(end).format("%H:%M")
        )),
        other => other,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;

    use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};

    use crate::domain::{BusinessCalendar, RepositoryProvider, Service};
    use crate::infrastructure::memory::InMemoryRepositoryProvider;

    /// Mon-Fri 09:00-18:00, 30 minute grid, UTC.
    pub fn calendar() -> BusinessCalendar {
        BusinessCalendar {
            opening_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            closing_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            open_weekdays: [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri]
                .into_iter()
                .collect(),
            step_minutes: 30,
            timezone: chrono_tz::UTC,
        }
    }

    /// First `weekday` strictly after today.
    pub fn next(weekday: Weekday) -> NaiveDate {
        let mut day = Utc::now().date_naive() + Duration::days(1);
        while day.weekday() != weekday {
            day += Duration::days(1);
        }
        day
    }

    pub async fn repos_with(services: &[(&str, i32)]) -> (Arc<dyn RepositoryProvider>, Vec<Service>) {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        repos.calendar().save(calendar()).await.unwrap();
        let mut saved = Vec::new();
        for (name, minutes) in services {
            saved.push(repos.services().save(Service::new(0, *name, *minutes)).await.unwrap());
        }
        (repos, saved)
    }
}
