//! Free-slot enumeration for a single day.
//!
//! Works on business-local wall time. The day window, the busy ranges and
//! the optional `not_before` instant must all be expressed in the same
//! local time base; the caller is responsible for the timezone conversion.

use chrono::{Duration, NaiveDateTime, NaiveTime};

use super::overlap::TimeRange;

/// Everything needed to enumerate the free start times of one day.
#[derive(Debug, Clone)]
pub struct SlotQuery<'a> {
    /// `[opening, closing)` of the day
    pub window: TimeRange<NaiveDateTime>,
    /// Combined duration of the requested services
    pub duration_minutes: i64,
    /// Grid spacing, anchored at the opening time
    pub step_minutes: i64,
    /// Blocking bookings of that day, in any order
    pub busy: &'a [TimeRange<NaiveDateTime>],
    /// No slot may start before this instant (usually "now")
    pub not_before: Option<NaiveDateTime>,
}

/// Round `instant` up to the next point of the step grid anchored at
/// `anchor`. Instants already on the grid are returned unchanged.
pub fn align_up(instant: NaiveDateTime, anchor: NaiveDateTime, step_minutes: i64) -> NaiveDateTime {
    if instant <= anchor {
        return anchor;
    }
    let step_secs = step_minutes * 60;
    let elapsed = (instant - anchor).num_seconds();
    let steps = (elapsed + step_secs - 1).div_euclid(step_secs);
    anchor + Duration::seconds(steps * step_secs)
}

/// Every start time at which an appointment of `duration_minutes` fits
/// between the existing bookings and inside the opening window.
///
/// The result is ascending and free of duplicates: the cursor only ever
/// moves forward.
pub fn compute_slots(query: &SlotQuery<'_>) -> Vec<NaiveTime> {
    let SlotQuery {
        window,
        duration_minutes,
        step_minutes,
        busy,
        not_before,
    } = *query;

    if duration_minutes <= 0 || step_minutes <= 0 || window.is_empty() {
        return Vec::new();
    }

    let duration = Duration::minutes(duration_minutes);
    let step = Duration::minutes(step_minutes);

    let mut cursor = window.start;
    if let Some(now) = not_before {
        if now > cursor {
            cursor = align_up(now, window.start, step_minutes);
        }
    }

    let mut bookings: Vec<TimeRange<NaiveDateTime>> = busy.to_vec();
    bookings.sort_by_key(|b| b.start);

    let mut slots = Vec::new();

    for booking in &bookings {
        let gap_end = booking.start.min(window.end);
        while cursor + duration <= gap_end {
            slots.push(cursor.time());
            cursor += step;
        }
        if booking.end > cursor {
            cursor = align_up(booking.end, window.start, step_minutes);
        }
    }

    while cursor + duration <= window.end {
        slots.push(cursor.time());
        cursor += step;
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 7).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        day().and_hms_opt(h, m, 0).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn query<'a>(duration: i64, busy: &'a [TimeRange<NaiveDateTime>]) -> SlotQuery<'a> {
        SlotQuery {
            window: TimeRange::new(at(9, 0), at(18, 0)),
            duration_minutes: duration,
            step_minutes: 30,
            busy,
            not_before: None,
        }
    }

    #[test]
    fn empty_day_offers_every_step_until_service_fits() {
        let slots = compute_slots(&query(60, &[]));
        assert_eq!(slots.len(), 17);
        assert_eq!(slots.first(), Some(&t(9, 0)));
        assert_eq!(slots.last(), Some(&t(17, 0)));
        assert!(slots.windows(2).all(|w| w[1] - w[0] == Duration::minutes(30)));
    }

    #[test]
    fn slot_touching_booking_is_offered() {
        let busy = [TimeRange::new(at(10, 0), at(11, 0))];
        let slots = compute_slots(&query(30, &busy));
        assert!(slots.contains(&t(9, 30)));
        assert!(!slots.contains(&t(10, 0)));
        assert!(!slots.contains(&t(10, 30)));
        let after: Vec<_> = slots.iter().filter(|s| **s > t(9, 30)).collect();
        assert_eq!(after.first(), Some(&&t(11, 0)));
    }

    #[test]
    fn booking_ending_off_grid_rounds_cursor_up() {
        let busy = [TimeRange::new(at(9, 0), at(9, 40))];
        let slots = compute_slots(&query(30, &busy));
        assert_eq!(slots.first(), Some(&t(10, 0)));
    }

    #[test]
    fn gap_too_small_for_service_is_skipped() {
        let busy = [
            TimeRange::new(at(9, 0), at(10, 0)),
            TimeRange::new(at(10, 30), at(12, 0)),
        ];
        let slots = compute_slots(&query(60, &busy));
        assert_eq!(slots.first(), Some(&t(12, 0)));
        let slots = compute_slots(&query(30, &busy));
        assert_eq!(slots.first(), Some(&t(10, 0)));
        assert_eq!(slots.get(1), Some(&t(12, 0)));
    }

    #[test]
    fn unsorted_and_overlapping_bookings_are_handled() {
        let busy = [
            TimeRange::new(at(13, 0), at(14, 0)),
            TimeRange::new(at(9, 0), at(12, 0)),
            TimeRange::new(at(11, 0), at(13, 30)),
        ];
        let slots = compute_slots(&query(30, &busy));
        assert_eq!(slots.first(), Some(&t(14, 0)));
        assert!(slots.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn not_before_is_rounded_up_to_the_grid() {
        let mut q = query(30, &[]);
        q.not_before = Some(at(10, 7));
        let slots = compute_slots(&q);
        assert_eq!(slots.first(), Some(&t(10, 30)));

        q.not_before = Some(at(10, 30));
        assert_eq!(compute_slots(&q).first(), Some(&t(10, 30)));
    }

    #[test]
    fn not_before_earlier_than_opening_has_no_effect() {
        let mut q = query(30, &[]);
        q.not_before = Some(at(6, 0));
        assert_eq!(compute_slots(&q).first(), Some(&t(9, 0)));
    }

    #[test]
    fn day_already_over_has_no_slots() {
        let mut q = query(30, &[]);
        q.not_before = Some(at(17, 45));
        assert!(compute_slots(&q).is_empty());
    }

    #[test]
    fn service_longer_than_day_has_no_slots() {
        assert!(compute_slots(&query(600, &[])).is_empty());
    }

    #[test]
    fn zero_duration_has_no_slots() {
        assert!(compute_slots(&query(0, &[])).is_empty());
    }

    #[test]
    fn computing_twice_gives_identical_result() {
        let busy = [TimeRange::new(at(12, 0), at(13, 0))];
        let q = query(45, &busy);
        assert_eq!(compute_slots(&q), compute_slots(&q));
    }

    #[test]
    fn no_returned_slot_overlaps_a_booking() {
        let busy = [
            TimeRange::new(at(9, 15), at(10, 5)),
            TimeRange::new(at(14, 0), at(15, 20)),
        ];
        let q = query(50, &busy);
        for slot in compute_slots(&q) {
            let start = day().and_time(slot);
            let candidate = TimeRange::new(start, start + Duration::minutes(50));
            assert!(busy.iter().all(|b| !candidate.overlaps(b)), "slot {slot} overlaps");
            assert!(candidate.end <= at(18, 0));
        }
    }

    #[test]
    fn align_up_keeps_grid_points() {
        assert_eq!(align_up(at(11, 0), at(9, 0), 30), at(11, 0));
        assert_eq!(align_up(at(11, 1), at(9, 0), 30), at(11, 30));
        assert_eq!(align_up(at(8, 0), at(9, 0), 30), at(9, 0));
    }
}
