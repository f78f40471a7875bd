//! Calendar handlers

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use tracing::info;

use super::dto::{CalendarDto, UpdateCalendarRequest};
use crate::domain::RepositoryProvider;
use crate::interfaces::http::common::{api_error, bad_request, ApiError, ApiResponse, ValidatedJson};

#[derive(Clone)]
pub struct CalendarState {
    pub repos: Arc<dyn RepositoryProvider>,
}

#[utoipa::path(
    get,
    path = "/api/v1/calendar",
    tag = "Calendar",
    responses(
        (status = 200, description = "Current business calendar", body = ApiResponse<CalendarDto>),
        (status = 500, description = "Business calendar not configured")
    )
)]
pub async fn get_calendar(
    State(state): State<CalendarState>,
) -> Result<Json<ApiResponse<CalendarDto>>, ApiError> {
    let calendar = state.repos.calendar().get().await.map_err(api_error)?;
    Ok(Json(ApiResponse::success(CalendarDto::from(calendar))))
}

#[utoipa::path(
    put,
    path = "/api/v1/calendar",
    tag = "Calendar",
    request_body = UpdateCalendarRequest,
    responses(
        (status = 200, description = "Calendar saved", body = ApiResponse<CalendarDto>),
        (status = 400, description = "Invalid hours, weekdays, step or timezone")
    )
)]
pub async fn update_calendar(
    State(state): State<CalendarState>,
    ValidatedJson(request): ValidatedJson<UpdateCalendarRequest>,
) -> Result<Json<ApiResponse<CalendarDto>>, ApiError> {
    let calendar = request.into_calendar().map_err(bad_request)?;
    state
        .repos
        .calendar()
        .save(calendar.clone())
        .await
        .map_err(api_error)?;

    info!(
        opening = %calendar.opening_time,
        closing = %calendar.closing_time,
        open_weekdays = %calendar.open_weekdays,
        step_minutes = calendar.step_minutes,
        "Business calendar updated"
    );
    Ok(Json(ApiResponse::success(CalendarDto::from(calendar))))
}
