//! Calendar module: opening hours, open days and slot step

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
