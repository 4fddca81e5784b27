use super::crud;
use super::error::AppError;
use super::schema::{
    CountMotionStepsRequest, CountMotionStepsResponse, DeleteStepEntryResponse,
    EditStepEntryRequest, EditStepEntryResponse, ExtractStepsFromImageRequest,
    ExtractStepsFromImageResponse, ExtractStepsRequest, ExtractStepsResponse,
    GetStepEntryResponse, HealthMetricsView, HealthResponse, SubmitStepEntryRequest,
    SubmitStepEntryResponse, ValidateStepEntryRequest, ValidateStepEntryResponse,
};
use crate::app::AppState;
use crate::service::extraction_service;
use crate::service::metrics_service;
use crate::service::motion_service;
use crate::service::ocr_service;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use tracing::{error, info};

pub async fn submit_step_entry(
    State(state): State<AppState>,
    Json(req): Json<SubmitStepEntryRequest>,
) -> impl IntoResponse {
    match crud::submit_step_entry(&state, req).await {
        Ok(resp) => {
            info!(entry_id = %resp.entry_id, participant_id = %resp.participant_id, steps = resp.steps, "step entry accepted");
            (axum::http::StatusCode::OK, Json(resp))
        }
        Err(err) => error_submit(err),
    }
}

pub async fn get_step_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> impl IntoResponse {
    match crud::get_step_entry(&state, &entry_id).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)),
        Err(err) => error_get(err),
    }
}

pub async fn validate_step_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
    Json(req): Json<ValidateStepEntryRequest>,
) -> impl IntoResponse {
    match crud::validate_step_entry(&state, &entry_id, req).await {
        Ok(resp) => {
            info!(entry_id = %entry_id, idempotent = resp.idempotent, "step entry judged");
            (axum::http::StatusCode::OK, Json(resp))
        }
        Err(err) => error_validate(err),
    }
}

pub async fn edit_step_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
    Json(req): Json<EditStepEntryRequest>,
) -> impl IntoResponse {
    match crud::edit_step_entry(&state, &entry_id, req).await {
        Ok(resp) => {
            info!(entry_id = %entry_id, previous_steps = resp.previous_steps, "step entry edited");
            (axum::http::StatusCode::OK, Json(resp))
        }
        Err(err) => error_edit(err),
    }
}

pub async fn delete_step_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> impl IntoResponse {
    match crud::delete_step_entry(&state, &entry_id).await {
        Ok(resp) => {
            info!(entry_id = %entry_id, "step entry deleted");
            (axum::http::StatusCode::OK, Json(resp))
        }
        Err(err) => error_delete(err),
    }
}

pub async fn extract_steps(
    State(_state): State<AppState>,
    Json(req): Json<ExtractStepsRequest>,
) -> impl IntoResponse {
    metrics_service::inc_extractions_run();
    let steps = extraction_service::extract_step_count(&req.text, &req.words);
    let found = steps > 0;
    if !found {
        metrics_service::inc_extractions_empty();
    }
    (
        axum::http::StatusCode::OK,
        Json(ExtractStepsResponse {
            found,
            steps,
            error_code: None,
            reason: if found {
                "step count extracted".to_string()
            } else {
                "no plausible step count found".to_string()
            },
        }),
    )
}

pub async fn extract_steps_from_image(
    State(state): State<AppState>,
    Json(req): Json<ExtractStepsFromImageRequest>,
) -> impl IntoResponse {
    let Some(engine) = &state.ocr else {
        return (
            axum::http::StatusCode::OK,
            Json(ExtractStepsFromImageResponse {
                available: false,
                found: false,
                steps: 0,
                error_code: Some("OCR_UNAVAILABLE".to_string()),
                reason: "no ocr engine configured".to_string(),
            }),
        );
    };
    if req.images_base64.is_empty() || req.images_base64.len() > 3 {
        return error_extract_image(AppError::bad_request(
            "INVALID_IMAGES",
            "between one and three image passes are required",
        ));
    }

    metrics_service::inc_extractions_run();
    match ocr_service::extract_from_image_passes(
        engine.as_ref(),
        &req.images_base64,
        state.config.ocr_timeout_seconds,
    )
    .await
    {
        Ok(steps) => {
            let found = steps > 0;
            if !found {
                metrics_service::inc_extractions_empty();
            }
            (
                axum::http::StatusCode::OK,
                Json(ExtractStepsFromImageResponse {
                    available: true,
                    found,
                    steps,
                    error_code: None,
                    reason: if found {
                        "step count extracted from screenshot".to_string()
                    } else {
                        "screenshot recognized but no plausible step count found".to_string()
                    },
                }),
            )
        }
        Err(err) => error_extract_image(err),
    }
}

pub async fn count_motion_steps(
    State(_state): State<AppState>,
    Json(req): Json<CountMotionStepsRequest>,
) -> impl IntoResponse {
    let samples_processed = req.samples.len() as u64;
    let steps = motion_service::count_steps(&req.samples);
    (
        axum::http::StatusCode::OK,
        Json(CountMotionStepsResponse {
            steps,
            samples_processed,
            error_code: None,
            reason: "motion samples processed".to_string(),
        }),
    )
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let redis_available = crate::infra::redis_available(&state.infra).await;

    let m = metrics_service::snapshot();
    let metrics = HealthMetricsView {
        entries_submitted: m.entries_submitted,
        entries_approved: m.entries_approved,
        entries_rejected: m.entries_rejected,
        entries_edited: m.entries_edited,
        entries_deleted: m.entries_deleted,
        participants_registered: m.participants_registered,
        participants_deleted: m.participants_deleted,
        extractions_run: m.extractions_run,
        extractions_empty: m.extractions_empty,
        last_error_ts: m.last_error_ts,
    };
    let ok = state.infra.is_none() || redis_available;

    (
        axum::http::StatusCode::OK,
        Json(HealthResponse {
            ok,
            redis_available,
            ocr_available: state.ocr.is_some(),
            metrics,
            error_code: None,
            reason: if ok {
                "healthy".to_string()
            } else {
                "redis configured but unavailable".to_string()
            },
        }),
    )
}

fn record_error(err: &AppError) {
    metrics_service::set_last_error_ts(Utc::now().timestamp());
    error!(error_code = err.code, reason = %err.message, "step entry request failed");
}

fn error_submit(err: AppError) -> (axum::http::StatusCode, Json<SubmitStepEntryResponse>) {
    record_error(&err);
    (
        err.status,
        Json(SubmitStepEntryResponse {
            accepted: false,
            entry_id: String::new(),
            participant_id: String::new(),
            steps: 0,
            status: None,
            day: String::new(),
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_get(err: AppError) -> (axum::http::StatusCode, Json<GetStepEntryResponse>) {
    record_error(&err);
    (
        err.status,
        Json(GetStepEntryResponse {
            found: false,
            entry: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_validate(err: AppError) -> (axum::http::StatusCode, Json<ValidateStepEntryResponse>) {
    record_error(&err);
    (
        err.status,
        Json(ValidateStepEntryResponse {
            updated: false,
            idempotent: false,
            entry: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_edit(err: AppError) -> (axum::http::StatusCode, Json<EditStepEntryResponse>) {
    record_error(&err);
    (
        err.status,
        Json(EditStepEntryResponse {
            updated: false,
            previous_steps: 0,
            entry: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_delete(err: AppError) -> (axum::http::StatusCode, Json<DeleteStepEntryResponse>) {
    record_error(&err);
    (
        err.status,
        Json(DeleteStepEntryResponse {
            deleted: false,
            entry_id: String::new(),
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_extract_image(
    err: AppError,
) -> (axum::http::StatusCode, Json<ExtractStepsFromImageResponse>) {
    record_error(&err);
    (
        err.status,
        Json(ExtractStepsFromImageResponse {
            available: true,
            found: false,
            steps: 0,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}
