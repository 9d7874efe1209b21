//! HTTP API: routes, CORS and error mapping.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use payrelay_common::{ConversionRequest, ConversionResponse, ErrorResponse};
use payrelay_fx::{FxEngine, FxError};
use thiserror::Error;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::CorsConfig;

/// State shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<FxEngine>,
    pub wallet_address: Arc<str>,
}

impl AppState {
    pub fn new(engine: Arc<FxEngine>, wallet_address: impl Into<Arc<str>>) -> Self {
        Self {
            engine,
            wallet_address: wallet_address.into(),
        }
    }
}

/// Errors surfaced to API clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body could not be parsed.
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    /// Conversion failed.
    #[error(transparent)]
    Fx(#[from] FxError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Fx(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Fx(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client.
    fn public_message(&self) -> &'static str {
        match self {
            ApiError::MalformedBody(_) => "Неверный формат запроса",
            ApiError::Fx(FxError::Validation(_)) => "Неверные параметры запроса",
            ApiError::Fx(FxError::RateUnavailable { .. }) => "Не удалось получить курс",
            ApiError::Fx(FxError::InvalidRate { .. }) => "Некорректный курс",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!(status = %status, error = %self, "Request failed");
        (status, Json(ErrorResponse::new(self.public_message()))).into_response()
    }
}

/// Build the CORS layer from configuration.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Skipping invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Build the application router.
pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/convert", post(convert))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn convert(
    State(state): State<AppState>,
    body: Result<Json<ConversionRequest>, JsonRejection>,
) -> Result<Json<ConversionResponse>, ApiError> {
    let Json(request) = body?;
    let conversion = state.engine.convert(&request).await?;
    Ok(Json(conversion.into_payment_response(&state.wallet_address)))
}
