//! Appointment (turno) domain entity

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::domain::catalog::Service;
use crate::domain::scheduling::TimeRange;
use crate::domain::{DomainError, DomainResult};

/// Appointment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    /// Booked, waiting for confirmation
    Pending,
    /// Confirmed by staff or client
    Confirmed,
    /// Service delivered
    Completed,
    /// Cancelled by staff or client
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "completed" => Some(Self::Completed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Pending and confirmed appointments occupy calendar time.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_blocking()
    }

    /// `pending -> confirmed`, `{pending, confirmed} -> {cancelled, completed}`.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Pending | Self::Confirmed, Self::Cancelled)
                | (Self::Pending | Self::Confirmed, Self::Completed)
        )
    }

    /// Validate a transition, returning the new status.
    pub fn transition_to(&self, next: AppointmentStatus) -> DomainResult<AppointmentStatus> {
        if *self == next {
            return Ok(next);
        }
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::validation(format!(
                "cannot change appointment status from {} to {}",
                self, next
            )))
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One service booked within an appointment, with the duration it had when
/// it was assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceAssignment {
    pub service_id: i32,
    pub duration_minutes: i32,
}

impl ServiceAssignment {
    /// Snapshot value meaning "not set yet".
    pub const UNSET_DURATION: i32 = 0;

    /// Snapshot the current effective duration of `service`.
    pub fn for_service(service: &Service) -> Self {
        Self {
            service_id: service.id,
            duration_minutes: service.effective_duration(),
        }
    }

    /// Re-assign `service`, keeping `previous` when it holds a real snapshot.
    pub fn snapshot(service: &Service, previous: Option<i32>) -> Self {
        match previous {
            Some(minutes) if minutes > Self::UNSET_DURATION => Self {
                service_id: service.id,
                duration_minutes: minutes,
            },
            _ => Self::for_service(service),
        }
    }
}

/// Sum of the assignment snapshots, in minutes.
pub fn assignments_duration(services: &[ServiceAssignment]) -> i32 {
    services.iter().map(|s| s.duration_minutes).sum()
}

/// Appointment aggregate
#[derive(Debug, Clone, PartialEq)]
pub struct Appointment {
    pub id: i32,
    pub client_id: i32,
    pub start: DateTime<Utc>,
    /// Derived: `start + duration_minutes`
    pub end: DateTime<Utc>,
    /// Derived: sum of the assignment snapshots
    pub duration_minutes: i32,
    /// Calendar date of `start` in the business timezone
    pub day: NaiveDate,
    pub status: AppointmentStatus,
    pub notes: String,
    pub services: Vec<ServiceAssignment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn range(&self) -> TimeRange<DateTime<Utc>> {
        TimeRange::new(self.start, self.end)
    }

    pub fn blocks_calendar(&self) -> bool {
        self.status.is_blocking()
    }

    pub fn service_ids(&self) -> Vec<i32> {
        self.services.iter().map(|s| s.service_id).collect()
    }

    /// Snapshot previously recorded for `service_id`, if any.
    pub fn snapshot_for(&self, service_id: i32) -> Option<i32> {
        self.services
            .iter()
            .find(|s| s.service_id == service_id)
            .map(|s| s.duration_minutes)
    }

}

/// Raised by a store when an appointment's status moved between the
/// caller's read and its write.
pub fn status_conflict(id: i32, expected: AppointmentStatus, actual: AppointmentStatus) -> DomainError {
    DomainError::validation(format!(
        "appointment {} is now {} (was {} when the change was requested)",
        id, actual, expected
    ))
}

/// A blocking booking as seen by the overlap check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookedSlot {
    pub id: i32,
    pub range: TimeRange<DateTime<Utc>>,
}

impl BookedSlot {
    pub fn new(id: i32, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id,
            range: TimeRange::new(start, end),
        }
    }
}

impl From<&Appointment> for BookedSlot {
    fn from(a: &Appointment) -> Self {
        Self::new(a.id, a.start, a.end)
    }
}

/// Fully validated appointment contents, ready to be written.
///
/// The store re-checks the range against the day's blocking bookings inside
/// its write transaction before persisting a blocking draft.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentDraft {
    pub client_id: i32,
    pub start: DateTime<Utc>,
    pub day: NaiveDate,
    pub status: AppointmentStatus,
    pub notes: String,
    pub services: Vec<ServiceAssignment>,
}

impl AppointmentDraft {
    pub fn duration_minutes(&self) -> i32 {
        assignments_duration(&self.services)
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.start + Duration::minutes(self.duration_minutes() as i64)
    }

    pub fn range(&self) -> TimeRange<DateTime<Utc>> {
        TimeRange::new(self.start, self.end())
    }

    /// Materialise the draft as a stored appointment.
    pub fn into_appointment(self, id: i32, created_at: DateTime<Utc>) -> Appointment {
        let end = self.end();
        let duration_minutes = self.duration_minutes();
        Appointment {
            id,
            client_id: self.client_id,
            start: self.start,
            end,
            duration_minutes,
            day: self.day,
            status: self.status,
            notes: self.notes,
            services: self.services,
            created_at,
            updated_at: Utc::now(),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
