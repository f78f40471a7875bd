//! Service catalog handlers

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use tracing::info;

use super::dto::{CreateServiceRequest, ServiceDto, UpdateServiceRequest};
use crate::domain::{DomainError, RepositoryProvider, Service, WeekdaySet};
use crate::interfaces::http::common::{api_error, ApiError, ApiResponse, ValidatedJson};

#[derive(Clone)]
pub struct ServiceState {
    pub repos: Arc<dyn RepositoryProvider>,
}

fn weekdays(names: Option<Vec<String>>) -> Result<Option<WeekdaySet>, ApiError> {
    names
        .map(|names| WeekdaySet::from_names(&names))
        .transpose()
        .map_err(api_error)
}

async fn load(state: &ServiceState, id: i32) -> Result<Service, ApiError> {
    state
        .repos
        .services()
        .find_by_id(id)
        .await
        .map_err(api_error)?
        .ok_or_else(|| {
            api_error(DomainError::NotFound {
                entity: "Service",
                field: "id",
                value: id.to_string(),
            })
        })
}

#[utoipa::path(
    get,
    path = "/api/v1/services",
    tag = "Services",
    responses(
        (status = 200, description = "Service catalog", body = ApiResponse<Vec<ServiceDto>>)
    )
)]
pub async fn list_services(
    State(state): State<ServiceState>,
) -> Result<Json<ApiResponse<Vec<ServiceDto>>>, ApiError> {
    let services = state.repos.services().find_all().await.map_err(api_error)?;
    Ok(Json(ApiResponse::success(
        services.into_iter().map(ServiceDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/services/{id}",
    tag = "Services",
    params(("id" = i32, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service details", body = ApiResponse<ServiceDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_service(
    State(state): State<ServiceState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ServiceDto>>, ApiError> {
    let service = load(&state, id).await?;
    Ok(Json(ApiResponse::success(ServiceDto::from(service))))
}

#[utoipa::path(
    post,
    path = "/api/v1/services",
    tag = "Services",
    request_body = CreateServiceRequest,
    responses(
        (status = 201, description = "Service created", body = ApiResponse<ServiceDto>),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn create_service(
    State(state): State<ServiceState>,
    ValidatedJson(request): ValidatedJson<CreateServiceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ServiceDto>>), ApiError> {
    let mut service = Service::new(0, request.name.trim(), request.duration_minutes);
    service.enabled = request.enabled;
    if let Some(days) = weekdays(request.offered_weekdays)? {
        service.offered_weekdays = days;
    }

    let saved = state.repos.services().save(service).await.map_err(api_error)?;
    info!(service_id = saved.id, name = %saved.name, "Service created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(ServiceDto::from(saved))),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/services/{id}",
    tag = "Services",
    params(("id" = i32, Path, description = "Service ID")),
    request_body = UpdateServiceRequest,
    responses(
        (status = 200, description = "Service updated", body = ApiResponse<ServiceDto>),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_service(
    State(state): State<ServiceState>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateServiceRequest>,
) -> Result<Json<ApiResponse<ServiceDto>>, ApiError> {
    let mut service = load(&state, id).await?;

    if let Some(name) = request.name {
        service.name = name.trim().to_string();
    }
    if let Some(minutes) = request.duration_minutes {
        service.duration_minutes = minutes;
    }
    if let Some(enabled) = request.enabled {
        service.enabled = enabled;
    }
    if let Some(days) = weekdays(request.offered_weekdays)? {
        service.offered_weekdays = days;
    }
    service.updated_at = Utc::now();

    state
        .repos
        .services()
        .update(service.clone())
        .await
        .map_err(api_error)?;
    info!(service_id = id, "Service updated");

    Ok(Json(ApiResponse::success(ServiceDto::from(service))))
}
