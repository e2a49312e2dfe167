//! Bearer-token verification.
//!
//! Tokens are HS256 JSON Web Tokens signed with the service secret. Device
//! tokens carry the owning `userId`, the `deviceId` and the granted rights.

use std::{fmt, sync::Arc};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";

// ---------------------------------------------------------------------------
// Claims
// ---------------------------------------------------------------------------

/// Named permissions carried in a token. Devices are users too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Right {
    ReadDevice,
    CreateDevice,
    DeleteDevice,
    ReadTrigger,
    CreateTrigger,
    DeleteTrigger,
    CreateDataPoint,
    /// Any right this service does not know about. Grants nothing.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default)]
    pub rights: Vec<Right>,
    /// Expiry as Unix seconds. Device tokens are issued without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl Claims {
    /// True when every right in `required` was granted.
    pub fn is_entitled_with(&self, required: &[Right]) -> bool {
        required
            .iter()
            .all(|r| *r != Right::Unknown && self.rights.contains(r))
    }
}

// ---------------------------------------------------------------------------
// Verifier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing authorization token")]
    MissingToken,
    #[error("malformed token")]
    Malformed,
    #[error("unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("invalid token signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("token has no {0} claim")]
    MissingClaim(&'static str),
}

#[derive(Deserialize)]
struct Header {
    alg: String,
}

/// Signs and verifies tokens with one shared secret.
#[derive(Clone)]
pub struct TokenVerifier {
    secret: Arc<[u8]>,
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier").finish_non_exhaustive()
    }
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: Arc::from(secret.as_bytes()),
        }
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length")
    }

    /// Issue a token for `claims`.
    pub fn sign(&self, claims: &Claims) -> Result<String, serde_json::Error> {
        let header = serde_json::json!({ "alg": ALGORITHM, "typ": "JWT" });
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?),
        );

        let mut mac = self.mac();
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{signing_input}.{signature}"))
    }

    /// Verify an `Authorization` header value. The `Bearer ` prefix is
    /// optional.
    pub fn verify_header(&self, value: Option<&str>) -> Result<Claims, AuthError> {
        let value = value.map(str::trim).filter(|v| !v.is_empty());
        let token = value.ok_or(AuthError::MissingToken)?;
        self.verify(token.strip_prefix("Bearer ").unwrap_or(token))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::Malformed);
        };

        let Header { alg } = decode_segment(header)?;
        if alg != ALGORITHM {
            return Err(AuthError::UnsupportedAlgorithm(alg));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::Malformed)?;
        let mut mac = self.mac();
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::BadSignature)?;

        let claims: Claims = decode_segment(payload)?;
        if let Some(exp) = claims.exp {
            if exp <= Utc::now().timestamp() {
                return Err(AuthError::Expired);
            }
        }

        Ok(claims)
    }
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, AuthError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::Malformed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
