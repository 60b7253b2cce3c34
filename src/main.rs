use axum::{
    Router,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use medibook_api_shared::{
    AdminUser, ApiError, AuthUser, HealthRes, HealthService, TokenService,
};
use medibook_core::{
    Appointment, AppointmentStatus, BookingError, BookingService, CatalogService, CoreConfig,
    Doctor, IdentityService, NewAccount, NewAppointment, NewDoctor, PublicUser, RecordId, Role,
};

/// Application state shared across REST API handlers
///
/// Holds the core services and the token service used by the auth gate. All services share
/// one `CoreConfig` resolved at startup.
#[derive(Clone)]
struct AppState {
    booking: BookingService,
    catalog: CatalogService,
    identity: IdentityService,
    tokens: TokenService,
}

impl FromRef<AppState> for TokenService {
    fn from_ref(state: &AppState) -> TokenService {
        state.tokens.clone()
    }
}

/// Login request body.
#[derive(Debug, Deserialize, ToSchema)]
struct LoginReq {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

/// Login response: a bearer token plus the public view of the account.
#[derive(Debug, Serialize, ToSchema)]
struct LoginRes {
    token: String,
    user: PublicUser,
}

/// Generic confirmation body used by register/cancel/delete responses.
#[derive(Debug, Serialize, ToSchema)]
struct MessageRes {
    message: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        register,
        login,
        list_doctors,
        create_doctor,
        delete_doctor,
        list_appointments,
        create_appointment,
        cancel_appointment
    ),
    components(schemas(
        HealthRes,
        NewAccount,
        LoginReq,
        LoginRes,
        MessageRes,
        PublicUser,
        Role,
        NewDoctor,
        Doctor,
        NewAppointment,
        Appointment,
        AppointmentStatus
    ))
)]
struct ApiDoc;

/// Main entry point for the MediBook backend
///
/// Starts the REST server (default port 5000, configurable via MEDIBOOK_ADDR) and seeds
/// the administrator account from the environment when configured.
///
/// # Environment Variables
/// - `MEDIBOOK_ADDR`: REST server address (default: "0.0.0.0:5000")
/// - `CLINIC_DATA_DIR`: Directory for clinic data storage (default: "/clinic_data")
/// - `MEDIBOOK_JWT_SECRET`: Secret for signing bearer tokens
/// - `MEDIBOOK_TOKEN_TTL_HOURS`: Token lifetime in hours (default: 24)
/// - `ADMIN_EMAIL` / `ADMIN_PASSWORD` / `ADMIN_NAME`: admin account seed
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medibook=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("MEDIBOOK_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".into());
    let data_dir = std::env::var("CLINIC_DATA_DIR").unwrap_or_else(|_| "/clinic_data".into());
    let jwt_secret = std::env::var("MEDIBOOK_JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("MEDIBOOK_JWT_SECRET not set, using development default");
        "medibook-dev-secret".into()
    });
    let ttl_hours: i64 = std::env::var("MEDIBOOK_TOKEN_TTL_HOURS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(24);

    let cfg = Arc::new(CoreConfig::new(PathBuf::from(data_dir)));
    let state = AppState {
        booking: BookingService::new(cfg.clone()),
        catalog: CatalogService::new(cfg.clone()),
        identity: IdentityService::new(cfg),
        tokens: TokenService::new(&jwt_secret, ttl_hours),
    };

    ensure_admin_user(&state.identity);

    tracing::info!("++ Starting MediBook REST on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

/// Builds the REST router with all routes, the OpenAPI document, and CORS.
fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/doctors", get(list_doctors).post(create_doctor))
        .route("/api/doctors/:id", delete(delete_doctor))
        .route(
            "/api/appointments",
            get(list_appointments).post(create_appointment),
        )
        .route("/api/appointments/:id", delete(cancel_appointment))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Seeds the administrator account from ADMIN_EMAIL / ADMIN_PASSWORD.
///
/// Skipped with a warning when either variable is unset; an already-existing account is
/// left untouched.
fn ensure_admin_user(identity: &IdentityService) {
    let (Ok(email), Ok(password)) = (
        std::env::var("ADMIN_EMAIL"),
        std::env::var("ADMIN_PASSWORD"),
    ) else {
        tracing::warn!("Admin seed skipped: ADMIN_EMAIL or ADMIN_PASSWORD is not set");
        return;
    };
    let name = std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Admin".into());

    match identity.ensure_admin(&name, &email, &password) {
        Ok(true) => tracing::info!("Seeded admin user: {}", email),
        Ok(false) => {}
        Err(e) => tracing::error!("Admin seed failed: {}", e),
    }
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint
///
/// Returns the current health status of the MediBook backend. Used for monitoring and
/// load balancer health checks.
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = NewAccount,
    responses(
        (status = 201, description = "Account created", body = MessageRes),
        (status = 400, description = "Missing or invalid fields"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
/// Register a new user account
///
/// Creates an account with the `user` role. The email must be unique
/// (case-insensitively); the password is stored only as a hash.
async fn register(
    State(state): State<AppState>,
    Json(input): Json<NewAccount>,
) -> Result<(StatusCode, Json<MessageRes>), ApiError> {
    match state.identity.register(input) {
        Ok(_) => Ok((
            StatusCode::CREATED,
            Json(MessageRes {
                message: "Registration successful".into(),
            }),
        )),
        Err(BookingError::InvalidInput(msg)) => Err(ApiError::Validation(msg)),
        Err(BookingError::DuplicateEmail) => Err(ApiError::Conflict(
            "An account with this email already exists".into(),
        )),
        Err(e) => {
            tracing::error!("Register error: {:?}", e);
            Err(ApiError::Internal("Failed to register user".into()))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Authenticated", body = LoginRes),
        (status = 400, description = "Missing credentials"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
/// Log in and obtain a bearer token
///
/// Verifies the credentials and issues a token encoding the caller id and role. Unknown
/// emails and wrong passwords fail identically.
async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginReq>,
) -> Result<Json<LoginRes>, ApiError> {
    let (Some(email), Some(password)) = (input.email, input.password) else {
        return Err(ApiError::Validation("Email and password are required".into()));
    };
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::Validation("Email and password are required".into()));
    }

    let account = match state.identity.verify_login(&email, &password) {
        Ok(account) => account,
        Err(BookingError::InvalidCredentials) => {
            return Err(ApiError::Auth("Invalid credentials".into()));
        }
        Err(e) => {
            tracing::error!("Login error: {:?}", e);
            return Err(ApiError::Internal("Failed to log in".into()));
        }
    };

    let token = state
        .tokens
        .issue(&account.id.to_string(), account.role.as_str())
        .map_err(|e| {
            tracing::error!("Token issue error: {:?}", e);
            ApiError::Internal("Failed to log in".into())
        })?;

    Ok(Json(LoginRes {
        token,
        user: account.public(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/doctors",
    responses(
        (status = 200, description = "List of doctors", body = [Doctor]),
        (status = 500, description = "Internal server error")
    )
)]
/// List all doctors in the catalog
///
/// Public endpoint; results are ordered newest first.
async fn list_doctors(State(state): State<AppState>) -> Json<Vec<Doctor>> {
    Json(state.catalog.list())
}

#[utoipa::path(
    post,
    path = "/api/doctors",
    request_body = NewDoctor,
    responses(
        (status = 201, description = "Doctor created", body = Doctor),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin role required"),
        (status = 500, description = "Internal server error")
    )
)]
/// Create a doctor (admin only)
async fn create_doctor(
    AdminUser(_caller): AdminUser,
    State(state): State<AppState>,
    Json(input): Json<NewDoctor>,
) -> Result<(StatusCode, Json<Doctor>), ApiError> {
    match state.catalog.create(input) {
        Ok(doctor) => Ok((StatusCode::CREATED, Json(doctor))),
        Err(BookingError::InvalidInput(msg)) => Err(ApiError::Validation(msg)),
        Err(e) => {
            tracing::error!("Create doctor error: {:?}", e);
            Err(ApiError::Internal("Failed to create doctor".into()))
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/doctors/{id}",
    params(("id" = String, Path, description = "Doctor record id")),
    responses(
        (status = 200, description = "Doctor deleted", body = MessageRes),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Doctor not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Delete a doctor (admin only)
///
/// Doctors are the only records that are hard-deleted; appointments referencing the
/// doctor keep their denormalized snapshot.
async fn delete_doctor(
    AdminUser(_caller): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageRes>, ApiError> {
    let id = RecordId::parse(&id).map_err(|_| ApiError::NotFound("Doctor not found".into()))?;

    match state.catalog.delete(&id) {
        Ok(()) => Ok(Json(MessageRes {
            message: "Doctor deleted".into(),
        })),
        Err(BookingError::NotFound) => Err(ApiError::NotFound("Doctor not found".into())),
        Err(e) => {
            tracing::error!("Delete doctor error: {:?}", e);
            Err(ApiError::Internal("Failed to delete doctor".into()))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/appointments",
    responses(
        (status = 200, description = "Caller's appointments, ordered by date then time", body = [Appointment]),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Internal server error")
    )
)]
/// List the caller's appointments
///
/// Only records owned by the authenticated caller are returned.
async fn list_appointments(
    AuthUser(caller): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    let owner = RecordId::parse(&caller.id)
        .map_err(|_| ApiError::Auth("Token verification failed".into()))?;
    Ok(Json(state.booking.list_for_owner(&owner)))
}

#[utoipa::path(
    post,
    path = "/api/appointments",
    request_body = NewAppointment,
    responses(
        (status = 201, description = "Appointment created", body = Appointment),
        (status = 400, description = "Missing appointment details"),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Internal server error")
    )
)]
/// Book an appointment
///
/// Persists a Confirmed appointment owned by the caller, with the booking date taken from
/// the server clock. The owner can never be supplied in the payload.
async fn create_appointment(
    AuthUser(caller): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<NewAppointment>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let owner = RecordId::parse(&caller.id)
        .map_err(|_| ApiError::Auth("Token verification failed".into()))?;

    match state.booking.create(&owner, input) {
        Ok(appointment) => Ok((StatusCode::CREATED, Json(appointment))),
        Err(BookingError::InvalidInput(msg)) => Err(ApiError::Validation(msg)),
        Err(e) => {
            tracing::error!("Create appointment error: {:?}", e);
            Err(ApiError::Internal("Failed to create appointment".into()))
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/appointments/{id}",
    params(("id" = String, Path, description = "Appointment record id")),
    responses(
        (status = 200, description = "Appointment cancelled", body = MessageRes),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Appointment not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Cancel an appointment
///
/// Soft-cancels the record: the status flips to Cancelled and the record is retained.
/// Records owned by other callers are reported as not found.
async fn cancel_appointment(
    AuthUser(caller): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageRes>, ApiError> {
    let owner = RecordId::parse(&caller.id)
        .map_err(|_| ApiError::Auth("Token verification failed".into()))?;
    let id =
        RecordId::parse(&id).map_err(|_| ApiError::NotFound("Appointment not found".into()))?;

    match state.booking.cancel(&owner, &id) {
        Ok(_) => Ok(Json(MessageRes {
            message: "Appointment cancelled".into(),
        })),
        Err(BookingError::NotFound) => {
            Err(ApiError::NotFound("Appointment not found".into()))
        }
        Err(e) => {
            tracing::error!("Cancel appointment error: {:?}", e);
            Err(ApiError::Internal("Failed to cancel appointment".into()))
        }
    }
}
