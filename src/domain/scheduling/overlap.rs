//! Half-open interval overlap checks

use chrono::{DateTime, Utc};

use crate::domain::appointment::BookedSlot;
use crate::domain::{DomainError, DomainResult};

/// A half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeRange<T> {
    pub start: T,
    pub end: T,
}

impl<T: PartialOrd + Copy> TimeRange<T> {
    pub fn new(start: T, end: T) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Two ranges overlap iff each starts before the other ends. Touching
    /// ranges (`a.end == b.start`) do not overlap, and an empty range
    /// overlaps nothing.
    pub fn overlaps(&self, other: &TimeRange<T>) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end && self.end > other.start
    }
}

/// Whether `candidate` overlaps any range in `existing`.
pub fn has_conflict<T: PartialOrd + Copy>(
    candidate: &TimeRange<T>,
    existing: &[TimeRange<T>],
) -> bool {
    existing.iter().any(|range| candidate.overlaps(range))
}

/// First booking that overlaps `candidate`, ignoring the booking with id
/// `exclude` (the appointment being rescheduled).
pub fn find_conflict<'a>(
    candidate: &TimeRange<DateTime<Utc>>,
    existing: &'a [BookedSlot],
    exclude: Option<i32>,
) -> Option<&'a BookedSlot> {
    existing
        .iter()
        .filter(|slot| Some(slot.id) != exclude)
        .find(|slot| candidate.overlaps(&slot.range))
}

/// Store-side guard: fail with [`DomainError::Overlap`] when `candidate`
/// collides with a blocking booking.
pub fn ensure_no_conflict(
    candidate: &TimeRange<DateTime<Utc>>,
    existing: &[BookedSlot],
    exclude: Option<i32>,
) -> DomainResult<()> {
    match find_conflict(candidate, existing, exclude) {
        Some(slot) => Err(DomainError::Overlap {
            appointment_id: slot.id,
            start: slot.range.start,
            end: slot.range.end,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 7, h, m, 0).unwrap()
    }

    fn range(h1: u32, m1: u32, h2: u32, m2: u32) -> TimeRange<DateTime<Utc>> {
        TimeRange::new(at(h1, m1), at(h2, m2))
    }

    #[test]
    fn touching_ranges_do_not_conflict() {
        let booked = range(10, 0, 11, 0);
        assert!(!range(9, 30, 10, 0).overlaps(&booked));
        assert!(!range(11, 0, 11, 30).overlaps(&booked));
    }

    #[test]
    fn partial_and_nested_ranges_conflict() {
        let booked = range(10, 0, 11, 0);
        assert!(range(9, 45, 10, 15).overlaps(&booked));
        assert!(range(10, 15, 10, 45).overlaps(&booked));
        assert!(range(9, 0, 12, 0).overlaps(&booked));
    }

    #[test]
    fn overlap_is_symmetric() {
        let pairs = [
            (range(9, 0, 10, 0), range(9, 30, 10, 30)),
            (range(9, 0, 10, 0), range(10, 0, 10, 30)),
            (range(9, 0, 12, 0), range(10, 0, 10, 30)),
            (range(8, 0, 8, 30), range(15, 0, 16, 0)),
        ];
        for (a, b) in pairs {
            assert_eq!(has_conflict(&a, &[b]), has_conflict(&b, &[a]));
        }
    }

    #[test]
    fn range_conflicts_with_itself() {
        let a = range(14, 0, 14, 30);
        assert!(has_conflict(&a, &[a]));
    }

    #[test]
    fn zero_length_candidate_never_conflicts() {
        let empty = range(10, 30, 10, 30);
        assert!(!has_conflict(&empty, &[range(10, 0, 11, 0)]));
        assert!(!has_conflict(&empty, &[empty]));
    }

    #[test]
    fn find_conflict_skips_excluded_booking() {
        let existing = vec![
            BookedSlot::new(1, at(10, 0), at(11, 0)),
            BookedSlot::new(2, at(12, 0), at(13, 0)),
        ];
        let candidate = range(10, 30, 12, 30);
        assert_eq!(find_conflict(&candidate, &existing, None).map(|s| s.id), Some(1));
        assert_eq!(find_conflict(&candidate, &existing, Some(1)).map(|s| s.id), Some(2));
        assert!(find_conflict(&range(10, 0, 11, 0), &existing, Some(1)).is_none());
    }

    #[test]
    fn ensure_no_conflict_reports_window() {
        let existing = vec![BookedSlot::new(5, at(10, 0), at(11, 0))];
        let err = ensure_no_conflict(&range(10, 30, 11, 0), &existing, None).unwrap_err();
        match err {
            DomainError::Overlap {
                appointment_id,
                start,
                end,
            } => {
                assert_eq!(appointment_id, 5);
                assert_eq!(start, at(10, 0));
                assert_eq!(end, at(11, 0));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
