pub mod dto;
pub mod errors;
pub mod extract;
pub mod handlers;

use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use handlers::ApiDoc;

use crate::{auth::TokenVerifier, readings::ReadingService};

#[derive(Clone)]
pub struct AppState {
    pub readings: ReadingService,
    pub verifier: TokenVerifier,
}

impl FromRef<AppState> for ReadingService {
    fn from_ref(state: &AppState) -> Self {
        state.readings.clone()
    }
}

impl FromRef<AppState> for TokenVerifier {
    fn from_ref(state: &AppState) -> Self {
        state.verifier.clone()
    }
}

pub fn router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route("/api/v1/data", post(handlers::create_reading))
        .with_state(state)
        .split_for_parts();

    router
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
}
