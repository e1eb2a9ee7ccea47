use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use crate::state::AppState;
use tome_service::{RecommendRequest, RecommendResponse, ServiceError};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/recommend", post(recommend))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn recommend(
	State(state): State<AppState>,
	Json(payload): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, ApiError> {
	let response = state.service.recommend(payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		// Upstream failure text can carry internal hosts and ports; it goes
		// to the log, never into the response body.
		let (status, error_code, message) = match err {
			ServiceError::InvalidRequest { message } =>
				(StatusCode::BAD_REQUEST, "invalid_request", message),
			err @ ServiceError::Provider { .. } => {
				tracing::error!(error = %err, "Embedding provider call failed.");

				(StatusCode::BAD_GATEWAY, "provider_error", UPSTREAM_FAILURE.to_string())
			},
			err @ ServiceError::VectorStore { .. } => {
				tracing::error!(error = %err, "Vector store call failed.");

				(StatusCode::BAD_GATEWAY, "vector_store_error", UPSTREAM_FAILURE.to_string())
			},
		};

		Self { status, error_code: error_code.to_string(), message }
	}
}

const UPSTREAM_FAILURE: &str = "The recommendation service is temporarily unavailable.";

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
