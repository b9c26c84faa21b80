//! HTTP request handlers for the pricing API.
//!
//! This module contains the handler functions for the `/calculate` and
//! `/explain` endpoints.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::post,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::PricingRequest;

use super::request::CalculationRequest;
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calculate", post(calculate_handler))
        .route("/explain", post(explain_handler))
        .with_state(state)
}

/// Handler for POST /calculate.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> impl IntoResponse {
    handle(state, payload, false)
}

/// Handler for POST /explain.
///
/// Identical to `/calculate` but always recomputes, bypassing the result
/// cache, so the per-rule trace reflects the live rule set.
async fn explain_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> impl IntoResponse {
    handle(state, payload, true)
}

fn handle(
    state: AppState,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
    explain: bool,
) -> axum::response::Response {
    // Correlation ID for request tracking
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, explain, "Processing pricing request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    if body_text.contains("missing field") {
                        ApiError::new("VALIDATION_ERROR", body_text)
                    } else {
                        ApiError::malformed_json(body_text)
                    }
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => ApiError::new(
                    "MISSING_CONTENT_TYPE",
                    "Content-Type must be application/json",
                ),
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            return (
                StatusCode::BAD_REQUEST,
                [(header::CONTENT_TYPE, "application/json")],
                Json(error),
            )
                .into_response();
        }
    };

    let domain_request: PricingRequest = match request.try_into() {
        Ok(request) => request,
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Invalid request");
            let response: ApiErrorResponse = err.into();
            return response.into_response();
        }
    };

    let engine = state.engine();
    let result = if explain {
        engine.explain(&domain_request)
    } else {
        engine.calculate(&domain_request)
    };

    match result {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                total = %result.total_cost,
                rule_set_version = %result.rule_set_version,
                "Calculation complete"
            );
            // Responses carry display values; rounding happens only here.
            (StatusCode::OK, Json(result.rounded())).into_response()
        }
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Calculation failed");
            let response: ApiErrorResponse = err.into();
            response.into_response()
        }
    }
}
