//! Business calendar aggregate
//!
//! Opening hours, open weekdays, slot granularity and timezone.

pub mod model;
pub mod repository;
pub mod weekday;

pub use model::BusinessCalendar;
pub use repository::CalendarConfigRepository;
pub use weekday::{canonical_weekday, weekday_name, WeekdaySet};
