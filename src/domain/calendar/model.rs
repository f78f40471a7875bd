//! Business calendar configuration

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::weekday::{weekday_name, WeekdaySet};
use crate::domain::scheduling::TimeRange;
use crate::domain::{DomainError, DomainResult};

/// Opening hours, open days and slot granularity of the business.
///
/// There is a single calendar for the whole business. It is loaded once per
/// operation and passed around explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessCalendar {
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
    pub open_weekdays: WeekdaySet,
    /// Distance between two consecutive offered slots, in minutes
    pub step_minutes: i32,
    /// Zone in which calendar dates and opening hours are interpreted
    pub timezone: Tz,
}

impl BusinessCalendar {
    pub fn validate(&self) -> DomainResult<()> {
        if self.opening_time >= self.closing_time {
            return Err(DomainError::validation(format!(
                "opening time {} must be before closing time {}",
                self.opening_time.format("%H:%M"),
                self.closing_time.format("%H:%M")
            )));
        }
        if self.step_minutes <= 0 {
            return Err(DomainError::validation(
                "slot step must be a positive number of minutes",
            ));
        }
        Ok(())
    }

    pub fn is_open_on(&self, date: NaiveDate) -> bool {
        self.open_weekdays.contains(date.weekday())
    }

    /// Error returned when something is requested on a closed day.
    pub fn closed_day_error(&self, date: NaiveDate) -> DomainError {
        DomainError::validation(format!(
            "the business is closed on {} ({})",
            weekday_name(date.weekday()),
            date
        ))
    }

    /// `[opening, closing)` on `date`, in business-local wall time.
    pub fn window_for(&self, date: NaiveDate) -> TimeRange<NaiveDateTime> {
        TimeRange::new(
            date.and_time(self.opening_time),
            date.and_time(self.closing_time),
        )
    }

    /// Business-local wall time of an instant.
    pub fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.timezone).naive_local()
    }

    /// Instant of a business-local wall time. Ambiguous times resolve to the
    /// earlier instant; times skipped by a DST jump are rejected.
    pub fn to_utc(&self, local: NaiveDateTime) -> DomainResult<DateTime<Utc>> {
        self.timezone
            .from_local_datetime(&local)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "{} does not exist in timezone {}",
                    local.format("%Y-%m-%d %H:%M"),
                    self.timezone
                ))
            })
    }

    /// Real time span of an appointment starting at local `start`, or
    /// `None` when that wall time is skipped by a DST jump or the
    /// appointment would end past closing time on the same date.
    ///
    /// Durations are elapsed minutes, so on a DST change day the local end
    /// can differ from `start + duration` read on the wall clock.
    pub fn booking_range(&self, start: NaiveDateTime, duration_minutes: i64) -> Option<TimeRange<DateTime<Utc>>> {
        let begin = self.to_utc(start).ok()?;
        let end = begin + Duration::minutes(duration_minutes);
        let local_end = self.to_local(end);
        (local_end.date() == start.date() && local_end.time() <= self.closing_time)
            .then(|| TimeRange::new(begin, end))
    }
}
