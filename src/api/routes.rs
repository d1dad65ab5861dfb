//! HTTP route handlers for Axum.

use axum::{extract::State, http::StatusCode, Json};
use tracing::{error, warn};

use crate::{
    api::types::{CatalogDto, ErrorDto, PredictRequest, StatusDto},
    error::PipelineError,
    report::InteractionReport,
};

use super::AppState;

type ApiError = (StatusCode, Json<ErrorDto>);
type ApiResult<T> = Result<Json<T>, ApiError>;

pub async fn home() -> Json<StatusDto> {
    Json(StatusDto {
        message: "Drug interaction prediction API running",
    })
}

pub async fn list_drugs(State(state): State<AppState>) -> Json<CatalogDto> {
    let drugs: Vec<String> = state
        .service
        .catalog()
        .entries()
        .map(|(_, canonical)| canonical.to_string())
        .collect();
    Json(CatalogDto {
        count: drugs.len(),
        drugs,
    })
}

pub async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> ApiResult<InteractionReport> {
    let service = state.service.clone();
    // Scoring is CPU-bound; a dropped request just abandons the blocking job.
    let outcome = tokio::task::spawn_blocking(move || service.analyze(&request.text, request.mode))
        .await
        .map_err(|join_err| {
            error!(%join_err, "analysis task failed");
            internal_error("analysis task failed".to_string())
        })?;
    outcome.map(Json).map_err(pipeline_error)
}

fn pipeline_error(err: PipelineError) -> ApiError {
    match err {
        PipelineError::InsufficientEntities { found } => {
            warn!(recognised = found.len(), "rejecting request with too few drugs");
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorDto {
                    error: "At least two known drugs required".to_string(),
                    detected_drugs: Some(found),
                }),
            )
        }
        other => {
            error!(error = %other, "analysis failed");
            internal_error(other.to_string())
        }
    }
}

fn internal_error(message: String) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorDto {
            error: message,
            detected_drugs: None,
        }),
    )
}
