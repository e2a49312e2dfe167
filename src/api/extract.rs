use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use super::errors::ApiError;
use crate::auth::{AuthError, Claims, TokenVerifier};

/// The device behind a request, resolved from its bearer token.
///
/// Rejects with `401` when the token is missing, invalid, or not bound to a
/// device. Rights are checked by the handler.
#[derive(Debug, Clone)]
pub struct DeviceIdentity {
    pub user_id: String,
    pub device_id: String,
    pub claims: Claims,
}

impl<S> FromRequestParts<S> for DeviceIdentity
where
    TokenVerifier: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let verifier = TokenVerifier::from_ref(state);
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let claims = verifier.verify_header(header)?;
        let device_id = claims
            .device_id
            .clone()
            .ok_or(AuthError::MissingClaim("deviceId"))?;

        Ok(Self {
            user_id: claims.user_id.clone(),
            device_id,
            claims,
        })
    }
}
