//! Shared HTTP building blocks

pub mod response;
pub mod validated_json;

pub use response::{api_error, bad_request, ApiError, ApiResponse, EmptyData};
pub use validated_json::ValidatedJson;
