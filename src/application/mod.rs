pub mod scheduling;
pub mod stock;

// Re-export key types for convenience
pub use scheduling::{
    AppointmentChanges, AppointmentScheduler, AvailabilityService, BookingRequest, Clock, SlotList,
};
pub use stock::LoggingStockHook;
