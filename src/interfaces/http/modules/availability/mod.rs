//! Availability module: free start times for a day and service combination

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
