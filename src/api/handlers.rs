use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::info;
use utoipa::OpenApi;

use super::{
    dto::{CreateReadingRequest, ErrorBody, ReadingDto},
    errors::ApiError,
    extract::DeviceIdentity,
};
use crate::{auth::Right, readings::ReadingService};

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Store a reading sent by an authenticated device.
///
/// The stored reading is returned as soon as it is persisted. The device's
/// triggers are evaluated afterwards; their outcome never affects this
/// response.
#[utoipa::path(
    post,
    path = "/api/v1/data",
    request_body = CreateReadingRequest,
    responses(
        (status = 200, description = "Reading stored", body = ReadingDto),
        (status = 400, description = "Missing or invalid body", body = ErrorBody),
        (status = 401, description = "Missing or illegal token", body = ErrorBody),
        (status = 403, description = "Token lacks the create-data-point right", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "data"
)]
pub async fn create_reading(
    State(readings): State<ReadingService>,
    identity: DeviceIdentity,
    body: Result<Json<CreateReadingRequest>, JsonRejection>,
) -> Result<Json<ReadingDto>, ApiError> {
    info!(user_id = %identity.user_id, device_id = %identity.device_id, "POST /api/v1/data");

    if !identity.claims.is_entitled_with(&[Right::CreateDataPoint]) {
        return Err(ApiError::Forbidden);
    }

    let Json(body) = body.map_err(|e| ApiError::IllegalRequestBody(e.body_text()))?;

    let reading = readings
        .ingest(&identity.user_id, &identity.device_id, body.into())
        .await?;

    Ok(Json(reading.into()))
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "system"
)]
pub async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// OpenAPI document
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(create_reading, health),
    components(schemas(CreateReadingRequest, ReadingDto, ErrorBody)),
    tags(
        (name = "data",   description = "Sensor reading ingestion"),
        (name = "system", description = "System endpoints"),
    ),
    info(
        title = "AirSense Data API",
        version = "0.1.0",
        description = "Ingests sensor readings and fires threshold triggers"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
