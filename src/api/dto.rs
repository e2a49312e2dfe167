use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::models::{NewReading, Reading};

/// Request body for `POST /api/v1/data`. Every field is optional.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReadingRequest {
    /// Relative humidity in percent.
    pub humidity: Option<f64>,
    /// Air pressure in pascal.
    pub pressure: Option<f64>,
    /// Temperature in °C. Devices send this as `temp`. A body carrying both
    /// `temp` and `temperature` is rejected as a duplicate field.
    #[serde(alias = "temp")]
    pub temperature: Option<f64>,
    /// Gas resistance in ohm.
    pub gas_resistance: Option<f64>,
}

impl From<CreateReadingRequest> for NewReading {
    fn from(r: CreateReadingRequest) -> Self {
        Self {
            humidity: r.humidity,
            pressure: r.pressure,
            temperature: r.temperature,
            gas_resistance: r.gas_resistance,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadingDto {
    pub id: Uuid,
    pub user_id: String,
    pub device_id: String,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub temperature: Option<f64>,
    pub gas_resistance: Option<f64>,
    pub created_on: DateTime<Utc>,
}

impl From<Reading> for ReadingDto {
    fn from(r: Reading) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            device_id: r.device_id,
            humidity: r.humidity,
            pressure: r.pressure,
            temperature: r.temperature,
            gas_resistance: r.gas_resistance,
            created_on: r.created_on,
        }
    }
}

/// Body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_owned(),
            details: None,
        }
    }

    pub fn with_details(message: &str, details: &str) -> Self {
        Self {
            message: message.to_owned(),
            details: Some(details.to_owned()),
        }
    }
}
