//! Slot query use case
//!
//! Loads the calendar, the requested services and the day's blocking
//! bookings, then runs the pure slot enumeration. Each candidate is checked
//! again on real instants, so a returned slot passes the same placement and
//! overlap checks as a booking. Nothing is cached and nothing is reserved.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use super::{ensure_services_offered, system_clock, Clock};
use crate::domain::catalog::total_duration;
use crate::domain::scheduling::{compute_slots, find_conflict, SlotQuery, TimeRange};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};

/// Free start times for one day and one service combination.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotList {
    pub date: NaiveDate,
    pub duration_minutes: i32,
    pub slots: Vec<NaiveTime>,
    /// Why the list is empty, when it is empty for a known reason
    pub message: Option<String>,
}

impl SlotList {
    fn unavailable(date: NaiveDate, duration_minutes: i32, reason: DomainError) -> Self {
        let message = match reason {
            DomainError::Validation(msg) => msg,
            other => other.to_string(),
        };
        Self {
            date,
            duration_minutes,
            slots: Vec::new(),
            message: Some(message),
        }
    }

    /// Slots rendered as `HH:MM`.
    pub fn formatted(&self) -> Vec<String> {
        self.slots
            .iter()
            .map(|t| t.format("%H:%M").to_string())
            .collect()
    }
}

pub struct AvailabilityService {
    repos: Arc<dyn RepositoryProvider>,
    clock: Clock,
}

impl AvailabilityService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self {
            repos,
            clock: system_clock(),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Bookable start times on `date` for the combination of `service_ids`.
    ///
    /// Fails with a configuration error when no calendar exists, and with a
    /// validation error when the service list is empty or names an unknown
    /// service. A closed day yields an empty list.
    pub async fn compute_slots(&self, date: NaiveDate, service_ids: &[i32]) -> DomainResult<SlotList> {
        let calendar = self.repos.calendar().get().await?;

        if service_ids.is_empty() {
            return Err(DomainError::validation("at least one service is required"));
        }

        let services = self
            .repos
            .services()
            .get_by_ids(service_ids)
            .await
            .map_err(|e| match e {
                DomainError::NotFound { value, .. } => {
                    DomainError::validation(format!("service {} does not exist", value))
                }
                other => other,
            })?;

        let duration = total_duration(&services);
        if duration <= 0 {
            return Err(DomainError::validation(
                "total duration of the requested services must be greater than zero",
            ));
        }

        if !calendar.is_open_on(date) {
            return Ok(SlotList::unavailable(date, duration, calendar.closed_day_error(date)));
        }

        if let Err(reason) = ensure_services_offered(&services, date) {
            return Ok(SlotList::unavailable(date, duration, reason));
        }

        let booked = self.repos.appointments().list_blocking(date).await?;
        let busy: Vec<TimeRange<NaiveDateTime>> = booked
            .iter()
            .map(|b| TimeRange::new(calendar.to_local(b.range.start), calendar.to_local(b.range.end)))
            .collect();

        let now = calendar.to_local((self.clock)());
        let grid = compute_slots(&SlotQuery {
            window: calendar.window_for(date),
            duration_minutes: duration as i64,
            step_minutes: calendar.step_minutes as i64,
            busy: &busy,
            not_before: Some(now),
        });

        // wall-clock arithmetic breaks on DST change days; keep only slots
        // whose real span fits and is free
        let slots: Vec<NaiveTime> = grid
            .into_iter()
            .filter(|slot| {
                calendar
                    .booking_range(date.and_time(*slot), duration as i64)
                    .is_some_and(|range| find_conflict(&range, &booked, None).is_none())
            })
            .collect();

        debug!(
            %date,
            duration_minutes = duration,
            bookings = busy.len(),
            slots = slots.len(),
            "Computed available slots"
        );

        Ok(SlotList {
            date,
            duration_minutes: duration,
            slots,
            message: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::scheduling::fixtures::{self, next, repos_with};
    use crate::application::scheduling::{AppointmentScheduler, BookingRequest};
    use crate::application::stock::LoggingStockHook;
    use crate::domain::{AppointmentDraft, AppointmentStatus, BusinessCalendar, Service, ServiceAssignment};
    use crate::infrastructure::memory::InMemoryRepositoryProvider;
    use chrono::{DateTime, Duration, Timelike, Utc, Weekday};

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn utc(date: NaiveDate, h: u32, m: u32) -> DateTime<Utc> {
        date.and_time(t(h, m)).and_utc()
    }

    async fn book(repos: &Arc<dyn RepositoryProvider>, date: NaiveDate, h: u32, minutes: i32, status: AppointmentStatus) {
        repos
            .appointments()
            .create(AppointmentDraft {
                client_id: 1,
                start: utc(date, h, 0),
                day: date,
                status,
                notes: String::new(),
                services: vec![ServiceAssignment {
                    service_id: 1,
                    duration_minutes: minutes,
                }],
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn empty_monday_offers_half_hour_grid() {
        let (repos, services) = repos_with(&[("Color", 60)]).await;
        let service = AvailabilityService::new(repos);

        let list = service.compute_slots(next(Weekday::Mon), &[services[0].id]).await.unwrap();

        assert_eq!(list.slots.len(), 17);
        assert_eq!(list.formatted().first().map(String::as_str), Some("09:00"));
        assert_eq!(list.formatted().last().map(String::as_str), Some("17:00"));
        assert!(list.message.is_none());
    }

    #[tokio::test]
    async fn confirmed_booking_is_skipped_but_touching_slot_kept() {
        let (repos, services) = repos_with(&[("Corte", 30)]).await;
        let monday = next(Weekday::Mon);
        book(&repos, monday, 10, 60, AppointmentStatus::Confirmed).await;

        let list = AvailabilityService::new(repos)
            .compute_slots(monday, &[services[0].id])
            .await
            .unwrap();

        assert!(list.slots.contains(&t(9, 30)));
        assert!(!list.slots.contains(&t(10, 0)));
        assert!(!list.slots.contains(&t(10, 30)));
        assert!(list.slots.contains(&t(11, 0)));
    }

    #[tokio::test]
    async fn cancelled_and_completed_bookings_do_not_block() {
        let (repos, services) = repos_with(&[("Corte", 30)]).await;
        let monday = next(Weekday::Mon);
        book(&repos, monday, 10, 60, AppointmentStatus::Cancelled).await;
        book(&repos, monday, 12, 60, AppointmentStatus::Completed).await;

        let list = AvailabilityService::new(repos)
            .compute_slots(monday, &[services[0].id])
            .await
            .unwrap();

        assert!(list.slots.contains(&t(10, 0)));
        assert!(list.slots.contains(&t(12, 0)));
    }

    #[tokio::test]
    async fn closed_weekday_returns_empty_list_not_error() {
        let (repos, services) = repos_with(&[("Corte", 30)]).await;
        let list = AvailabilityService::new(repos)
            .compute_slots(next(Weekday::Sun), &[services[0].id])
            .await
            .unwrap();

        assert!(list.slots.is_empty());
        assert!(list.message.unwrap().contains("closed on sunday"));
    }

    #[tokio::test]
    async fn empty_service_list_is_validation_error() {
        let (repos, _) = repos_with(&[]).await;
        let err = AvailabilityService::new(repos)
            .compute_slots(next(Weekday::Mon), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_service_is_validation_error() {
        let (repos, _) = repos_with(&[("Corte", 30)]).await;
        let err = AvailabilityService::new(repos)
            .compute_slots(next(Weekday::Mon), &[404])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("404")));
    }

    #[tokio::test]
    async fn missing_calendar_is_configuration_error() {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        let err = AvailabilityService::new(repos)
            .compute_slots(next(Weekday::Mon), &[1])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Configuration(_)));
    }

    #[tokio::test]
    async fn disabled_service_yields_no_slots() {
        let (repos, services) = repos_with(&[("Color", 60)]).await;
        let mut color = services[0].clone();
        color.enabled = false;
        repos.services().update(color).await.unwrap();

        let list = AvailabilityService::new(repos)
            .compute_slots(next(Weekday::Mon), &[services[0].id])
            .await
            .unwrap();
        assert!(list.slots.is_empty());
        assert!(list.message.unwrap().contains("disabled"));
    }

    #[tokio::test]
    async fn zero_duration_service_uses_fallback() {
        let (repos, services) = repos_with(&[("Consulta", 0)]).await;
        let list = AvailabilityService::new(repos)
            .compute_slots(next(Weekday::Mon), &[services[0].id])
            .await
            .unwrap();
        assert_eq!(list.duration_minutes, 30);
        assert_eq!(list.slots.last(), Some(&t(17, 30)));
    }

    #[tokio::test]
    async fn today_starts_after_now_rounded_up() {
        let (repos, services) = repos_with(&[("Corte", 30)]).await;
        let monday = next(Weekday::Mon);
        let now = utc(monday, 10, 7);
        let service = AvailabilityService::new(repos).with_clock(Arc::new(move || now));

        let list = service.compute_slots(monday, &[services[0].id]).await.unwrap();
        assert_eq!(list.slots.first(), Some(&t(10, 30)));

        // a past day offers nothing
        let earlier = monday - Duration::days(7);
        let list = service.compute_slots(earlier, &[services[0].id]).await.unwrap();
        assert!(list.slots.is_empty());
    }

    #[tokio::test]
    async fn every_offered_slot_can_be_booked() {
        let (repos, services) = repos_with(&[("Corte", 45), ("Consulta", 0)]).await;
        let mut calendar = fixtures::calendar();
        calendar.timezone = chrono_tz::America::Argentina::Buenos_Aires;
        repos.calendar().save(calendar.clone()).await.unwrap();
        let scheduler = AppointmentScheduler::new(repos.clone(), Arc::new(LoggingStockHook));
        let monday = next(Weekday::Mon);
        let local = |h: u32, m: u32| calendar.to_utc(monday.and_time(t(h, m))).unwrap();
        let booking = |start, service_ids: Vec<i32>| BookingRequest {
            client_id: 3,
            start,
            service_ids,
            notes: None,
        };

        // one on the grid, one off it
        scheduler.create(booking(local(10, 0), vec![services[0].id])).await.unwrap();
        scheduler.create(booking(local(13, 10), vec![services[1].id])).await.unwrap();

        let ids = vec![services[0].id, services[1].id];
        let list = AvailabilityService::new(repos.clone())
            .compute_slots(monday, &ids)
            .await
            .unwrap();
        assert_eq!(list.duration_minutes, 75);
        assert!(!list.slots.is_empty());
        assert!(!list.slots.contains(&t(9, 0)));
        assert!(list.slots.contains(&t(14, 0)));

        for slot in &list.slots {
            let start = local(slot.hour(), slot.minute());
            let appt = scheduler
                .create(booking(start, ids.clone()))
                .await
                .unwrap_or_else(|e| panic!("slot {} was offered but booking failed: {}", slot, e));
            assert_eq!(appt.day, monday);
            scheduler.cancel(appt.id).await.unwrap();
        }
    }

    #[tokio::test]
    async fn wall_times_skipped_by_dst_are_not_offered() {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        repos
            .calendar()
            .save(BusinessCalendar {
                opening_time: t(1, 0),
                closing_time: t(5, 0),
                open_weekdays: [Weekday::Sun].into_iter().collect(),
                step_minutes: 30,
                timezone: chrono_tz::Europe::Madrid,
            })
            .await
            .unwrap();
        let corte = repos.services().save(Service::new(0, "Corte", 30)).await.unwrap();
        let before = utc(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(), 0, 0);
        let service = AvailabilityService::new(repos).with_clock(Arc::new(move || before));

        // Madrid moves from 02:00 to 03:00 that night
        let dst_day = NaiveDate::from_ymd_opt(2030, 3, 31).unwrap();
        let list = service.compute_slots(dst_day, &[corte.id]).await.unwrap();

        assert_eq!(
            list.slots,
            vec![t(1, 0), t(1, 30), t(3, 0), t(3, 30), t(4, 0), t(4, 30)]
        );
    }

    #[tokio::test]
    async fn repeated_queries_are_identical() {
        let (repos, services) = repos_with(&[("Corte", 45), ("Lavado", 15)]).await;
        let monday = next(Weekday::Mon);
        book(&repos, monday, 13, 90, AppointmentStatus::Pending).await;
        let service = AvailabilityService::new(repos);
        let ids = [services[0].id, services[1].id];

        let first = service.compute_slots(monday, &ids).await.unwrap();
        let second = service.compute_slots(monday, &ids).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.duration_minutes, 60);
    }
}
