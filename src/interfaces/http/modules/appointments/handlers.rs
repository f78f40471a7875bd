//! Appointment handlers

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;

use super::dto::{parse_start, AgendaQuery, AppointmentDto, CreateAppointmentRequest, UpdateAppointmentRequest};
use crate::application::{AppointmentChanges, AppointmentScheduler, BookingRequest};
use crate::domain::{AppointmentStatus, DomainError, RepositoryProvider};
use crate::interfaces::http::common::{api_error, bad_request, ApiError, ApiResponse, ValidatedJson};

#[derive(Clone)]
pub struct AppointmentState {
    pub repos: Arc<dyn RepositoryProvider>,
    pub scheduler: Arc<AppointmentScheduler>,
}

type AppointmentResult = Result<Json<ApiResponse<AppointmentDto>>, ApiError>;

#[utoipa::path(
    post,
    path = "/api/v1/appointments",
    tag = "Appointments",
    request_body = CreateAppointmentRequest,
    responses(
        (status = 201, description = "Appointment booked", body = ApiResponse<AppointmentDto>),
        (status = 400, description = "Rejected: past, closed, outside hours or overlapping"),
        (status = 404, description = "Unknown service"),
        (status = 500, description = "Business calendar not configured")
    )
)]
pub async fn create_appointment(
    State(state): State<AppointmentState>,
    ValidatedJson(request): ValidatedJson<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AppointmentDto>>), ApiError> {
    let start = parse_start(&request.start).map_err(bad_request)?;

    let appointment = state
        .scheduler
        .create(BookingRequest {
            client_id: request.client_id,
            start,
            service_ids: request.service_ids,
            notes: request.notes,
        })
        .await
        .map_err(api_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(AppointmentDto::from(appointment))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/appointments",
    tag = "Appointments",
    params(AgendaQuery),
    responses(
        (status = 200, description = "Appointments of the day, by start time", body = ApiResponse<Vec<AppointmentDto>>),
        (status = 400, description = "Invalid date")
    )
)]
pub async fn list_appointments(
    State(state): State<AppointmentState>,
    Query(query): Query<AgendaQuery>,
) -> Result<Json<ApiResponse<Vec<AppointmentDto>>>, ApiError> {
    let day = NaiveDate::parse_from_str(query.date.trim(), "%Y-%m-%d")
        .map_err(|_| bad_request(format!("invalid date '{}', expected YYYY-MM-DD", query.date)))?;

    let appointments = state
        .repos
        .appointments()
        .find_by_day(day)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::success(
        appointments.into_iter().map(AppointmentDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/appointments/{id}",
    tag = "Appointments",
    params(("id" = i32, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment details", body = ApiResponse<AppointmentDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_appointment(
    State(state): State<AppointmentState>,
    Path(id): Path<i32>,
) -> AppointmentResult {
    let appointment = state
        .repos
        .appointments()
        .find_by_id(id)
        .await
        .map_err(api_error)?
        .ok_or_else(|| {
            api_error(DomainError::NotFound {
                entity: "Appointment",
                field: "id",
                value: id.to_string(),
            })
        })?;

    Ok(Json(ApiResponse::success(AppointmentDto::from(appointment))))
}

#[utoipa::path(
    put,
    path = "/api/v1/appointments/{id}",
    tag = "Appointments",
    params(("id" = i32, Path, description = "Appointment ID")),
    request_body = UpdateAppointmentRequest,
    responses(
        (status = 200, description = "Appointment updated", body = ApiResponse<AppointmentDto>),
        (status = 400, description = "Rejected change"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_appointment(
    State(state): State<AppointmentState>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateAppointmentRequest>,
) -> AppointmentResult {
    let start = request
        .start
        .as_deref()
        .map(parse_start)
        .transpose()
        .map_err(bad_request)?;
    let status = request
        .status
        .as_deref()
        .map(|s| {
            AppointmentStatus::parse(s).ok_or_else(|| bad_request(format!("unknown status '{}'", s)))
        })
        .transpose()?;

    let appointment = state
        .scheduler
        .update(
            id,
            AppointmentChanges {
                start,
                service_ids: request.service_ids,
                notes: request.notes,
                status,
            },
        )
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::success(AppointmentDto::from(appointment))))
}

#[utoipa::path(
    post,
    path = "/api/v1/appointments/{id}/confirm",
    tag = "Appointments",
    params(("id" = i32, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment confirmed", body = ApiResponse<AppointmentDto>),
        (status = 400, description = "Transition not allowed"),
        (status = 404, description = "Not found")
    )
)]
pub async fn confirm_appointment(
    State(state): State<AppointmentState>,
    Path(id): Path<i32>,
) -> AppointmentResult {
    let appointment = state.scheduler.confirm(id).await.map_err(api_error)?;
    Ok(Json(ApiResponse::success(AppointmentDto::from(appointment))))
}

#[utoipa::path(
    post,
    path = "/api/v1/appointments/{id}/cancel",
    tag = "Appointments",
    params(("id" = i32, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment cancelled", body = ApiResponse<AppointmentDto>),
        (status = 400, description = "Transition not allowed"),
        (status = 404, description = "Not found")
    )
)]
pub async fn cancel_appointment(
    State(state): State<AppointmentState>,
    Path(id): Path<i32>,
) -> AppointmentResult {
    let appointment = state.scheduler.cancel(id).await.map_err(api_error)?;
    Ok(Json(ApiResponse::success(AppointmentDto::from(appointment))))
}

#[utoipa::path(
    post,
    path = "/api/v1/appointments/{id}/complete",
    tag = "Appointments",
    params(("id" = i32, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment completed", body = ApiResponse<AppointmentDto>),
        (status = 400, description = "Transition not allowed"),
        (status = 404, description = "Not found")
    )
)]
pub async fn complete_appointment(
    State(state): State<AppointmentState>,
    Path(id): Path<i32>,
) -> AppointmentResult {
    let appointment = state.scheduler.complete(id).await.map_err(api_error)?;
    Ok(Json(ApiResponse::success(AppointmentDto::from(appointment))))
}
