//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{AppointmentScheduler, AvailabilityService};
use crate::domain::RepositoryProvider;

use super::common::{ApiResponse, EmptyData};
use super::modules::{appointments, availability, calendar, health, metrics, request_id, services};

/// Unified state for every API route.
/// Axum extracts the specific handler state via `FromRef`.
#[derive(Clone)]
pub struct ApiState {
    pub repos: Arc<dyn RepositoryProvider>,
    pub availability: Arc<AvailabilityService>,
    pub scheduler: Arc<AppointmentScheduler>,
    /// `None` when running on in-memory storage
    pub db: Option<DatabaseConnection>,
    pub started_at: Arc<Instant>,
}

impl ApiState {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        availability: Arc<AvailabilityService>,
        scheduler: Arc<AppointmentScheduler>,
        db: Option<DatabaseConnection>,
    ) -> Self {
        Self {
            repos,
            availability,
            scheduler,
            db,
            started_at: Arc::new(Instant::now()),
        }
    }
}

// -- FromRef implementations so each handler keeps its own State<T> extractor --

impl FromRef<ApiState> for availability::AvailabilityState {
    fn from_ref(s: &ApiState) -> Self {
        availability::AvailabilityState {
            availability: Arc::clone(&s.availability),
        }
    }
}

impl FromRef<ApiState> for appointments::AppointmentState {
    fn from_ref(s: &ApiState) -> Self {
        appointments::AppointmentState {
            repos: Arc::clone(&s.repos),
            scheduler: Arc::clone(&s.scheduler),
        }
    }
}

impl FromRef<ApiState> for calendar::CalendarState {
    fn from_ref(s: &ApiState) -> Self {
        calendar::CalendarState {
            repos: Arc::clone(&s.repos),
        }
    }
}

impl FromRef<ApiState> for services::ServiceState {
    fn from_ref(s: &ApiState) -> Self {
        services::ServiceState {
            repos: Arc::clone(&s.repos),
        }
    }
}

impl FromRef<ApiState> for health::HealthState {
    fn from_ref(s: &ApiState) -> Self {
        health::HealthState {
            repos: Arc::clone(&s.repos),
            db: s.db.clone(),
            started_at: Arc::clone(&s.started_at),
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Availability
        availability::get_availability,
        // Appointments
        appointments::create_appointment,
        appointments::list_appointments,
        appointments::get_appointment,
        appointments::update_appointment,
        appointments::confirm_appointment,
        appointments::cancel_appointment,
        appointments::complete_appointment,
        // Calendar
        calendar::get_calendar,
        calendar::update_calendar,
        // Services
        services::list_services,
        services::get_service,
        services::create_service,
        services::update_service,
    ),
    components(
        schemas(
            // Common
            ApiResponse<String>,
            EmptyData,
            health::HealthResponse,
            health::ComponentHealth,
            // Availability
            availability::AvailabilityDto,
            // Appointments
            appointments::AppointmentDto,
            appointments::AppointmentServiceDto,
            appointments::CreateAppointmentRequest,
            appointments::UpdateAppointmentRequest,
            // Calendar
            calendar::CalendarDto,
            calendar::UpdateCalendarRequest,
            // Services
            services::ServiceDto,
            services::CreateServiceRequest,
            services::UpdateServiceRequest,
        )
    ),
    tags(
        (name = "Health", description = "Server health check endpoints"),
        (name = "Availability", description = "Free start times for a day and a combination of services"),
        (name = "Appointments", description = "Booking, rescheduling and status changes"),
        (name = "Calendar", description = "Opening hours, open days and slot granularity"),
        (name = "Services", description = "Service catalog administration"),
    ),
    info(
        title = "Salon Booking API",
        version = "1.0.0",
        description = "REST API for salon appointment scheduling",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// `/api/v1` routes, still waiting for their state.
fn api_routes() -> Router<ApiState> {
    Router::new()
        .route("/availability", get(availability::get_availability))
        .route(
            "/appointments",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route(
            "/appointments/{id}",
            get(appointments::get_appointment).put(appointments::update_appointment),
        )
        .route("/appointments/{id}/confirm", post(appointments::confirm_appointment))
        .route("/appointments/{id}/cancel", post(appointments::cancel_appointment))
        .route("/appointments/{id}/complete", post(appointments::complete_appointment))
        .route(
            "/calendar",
            get(calendar::get_calendar).put(calendar::update_calendar),
        )
        .route(
            "/services",
            get(services::list_services).post(services::create_service),
        )
        .route(
            "/services/{id}",
            get(services::get_service).put(services::update_service),
        )
}

/// Create the API router with all routes.
///
/// `/metrics` is mounted only when a Prometheus handle is given.
pub fn create_api_router(state: ApiState, metrics_handle: Option<PrometheusHandle>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let mut router = Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Booking API
        .nest("/api/v1", api_routes())
        .with_state(state)
        // Swagger UI
        .merge(swagger_routes);

    if let Some(handle) = metrics_handle {
        let metrics_routes = Router::new()
            .route("/metrics", get(metrics::prometheus_metrics))
            .with_state(metrics::MetricsState { handle });
        router = router.merge(metrics_routes);
    }

    // Middleware
    router
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
