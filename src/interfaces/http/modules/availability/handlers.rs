//! Availability handlers

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;

use super::dto::{AvailabilityDto, AvailabilityQuery};
use crate::application::AvailabilityService;
use crate::interfaces::http::common::{api_error, bad_request, ApiError, ApiResponse};

#[derive(Clone)]
pub struct AvailabilityState {
    pub availability: Arc<AvailabilityService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/availability",
    tag = "Availability",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Free start times (possibly empty)", body = ApiResponse<AvailabilityDto>),
        (status = 400, description = "Invalid date or service list"),
        (status = 500, description = "Business calendar not configured")
    )
)]
pub async fn get_availability(
    State(state): State<AvailabilityState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<ApiResponse<AvailabilityDto>>, ApiError> {
    let date = query.parse_date().map_err(bad_request)?;
    let service_ids = query.parse_service_ids().map_err(bad_request)?;

    let slots = state
        .availability
        .compute_slots(date, &service_ids)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::success(AvailabilityDto::from(slots))))
}
