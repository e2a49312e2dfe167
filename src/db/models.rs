use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One persisted sensor sample.
///
/// Units follow the device firmware: humidity in percent, pressure in pascal,
/// temperature in °C and gas resistance in ohm. Any subset may be absent.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Reading {
    pub id: Uuid,
    pub user_id: String,
    pub device_id: String,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub temperature: Option<f64>,
    pub gas_resistance: Option<f64>,
    pub created_on: DateTime<Utc>,
}

/// Measurement values of a reading that has not been stored yet.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NewReading {
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub temperature: Option<f64>,
    pub gas_resistance: Option<f64>,
}

impl NewReading {
    /// Stamp the measurement with a fresh id, its owners and the current time.
    ///
    /// The timestamp is truncated to microseconds, the resolution Postgres
    /// keeps for `timestamptz`.
    pub fn into_reading(self, user_id: &str, device_id: &str) -> Reading {
        Reading {
            id: Uuid::new_v4(),
            user_id: user_id.to_owned(),
            device_id: device_id.to_owned(),
            humidity: self.humidity,
            pressure: self.pressure,
            temperature: self.temperature,
            gas_resistance: self.gas_resistance,
            created_on: Utc::now().trunc_subsecs(6),
        }
    }
}

/// A user-defined threshold rule bound to one `(user_id, device_id)` pair.
///
/// `parameter` and `operator` hold the raw stored strings. They are resolved
/// on every evaluation, see `triggers::parameter` and `triggers::comparator`.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Trigger {
    pub id: Uuid,
    pub user_id: String,
    pub device_id: String,
    pub name: String,
    /// Notification target, called with `POST` when the trigger fires.
    pub post_url: String,
    pub threshold: f64,
    /// One of `humidity`, `pressure`, `temperature`, `gasResistance`.
    pub parameter: String,
    /// One of `gt`, `gte`, `lt`, `lte`.
    pub operator: String,
    pub created_on: DateTime<Utc>,
}
