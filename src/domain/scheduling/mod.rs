//! Scheduling core: overlap validation and availability computation.
//!
//! Pure functions over time ranges; loading bookings and calendars is the
//! job of the application layer.

pub mod availability;
pub mod overlap;

pub use availability::{align_up, compute_slots, SlotQuery};
pub use overlap::{ensure_no_conflict, find_conflict, has_conflict, TimeRange};
