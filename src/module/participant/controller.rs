use super::crud;
use super::schema::{
    AdminSummaryResponse, DeleteParticipantResponse, GetParticipantResponse, GetStreakResponse,
    LeaderboardResponse, RegisterParticipantRequest, RegisterParticipantResponse,
};
use crate::app::AppState;
use crate::module::step_entry::crud as entry_crud;
use crate::module::step_entry::error::AppError;
use crate::module::step_entry::schema::GetStepEntriesByParticipantResponse;
use crate::service::metrics_service;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use tracing::{error, info};

pub async fn register_participant(
    State(state): State<AppState>,
    Json(req): Json<RegisterParticipantRequest>,
) -> impl IntoResponse {
    match crud::register_participant(&state, req).await {
        Ok(resp) => {
            if let Some(participant) = &resp.participant {
                info!(participant_id = %participant.participant_id, name = %participant.name, "participant registered");
            }
            (axum::http::StatusCode::OK, Json(resp))
        }
        Err(err) => error_register(err),
    }
}

pub async fn get_participant(
    State(state): State<AppState>,
    Path(participant_id): Path<String>,
) -> impl IntoResponse {
    match crud::get_participant(&state, &participant_id).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)),
        Err(err) => error_get(err),
    }
}

pub async fn get_participant_entries(
    State(state): State<AppState>,
    Path(participant_id): Path<String>,
) -> impl IntoResponse {
    match entry_crud::get_entries_by_participant(&state, &participant_id).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)),
        Err(err) => {
            record_error(&err);
            (
                err.status,
                Json(GetStepEntriesByParticipantResponse {
                    found: false,
                    participant_id,
                    entries: Vec::new(),
                    error_code: Some(err.code.to_string()),
                    reason: err.message,
                }),
            )
        }
    }
}

pub async fn get_streak(
    State(state): State<AppState>,
    Path(participant_id): Path<String>,
) -> impl IntoResponse {
    match crud::get_streak(&state, &participant_id).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)),
        Err(err) => {
            record_error(&err);
            (
                err.status,
                Json(GetStreakResponse {
                    found: false,
                    participant_id,
                    streak: 0,
                    goal_days: 0,
                    error_code: Some(err.code.to_string()),
                    reason: err.message,
                }),
            )
        }
    }
}

pub async fn delete_participant(
    State(state): State<AppState>,
    Path(participant_id): Path<String>,
) -> impl IntoResponse {
    match crud::delete_participant(&state, &participant_id).await {
        Ok(resp) => {
            info!(participant_id = %resp.participant_id, entries_removed = resp.entries_removed, "participant deleted");
            (axum::http::StatusCode::OK, Json(resp))
        }
        Err(err) => {
            record_error(&err);
            (
                err.status,
                Json(DeleteParticipantResponse {
                    deleted: false,
                    participant_id,
                    entries_removed: 0,
                    error_code: Some(err.code.to_string()),
                    reason: err.message,
                }),
            )
        }
    }
}

pub async fn leaderboard(State(state): State<AppState>) -> impl IntoResponse {
    match crud::leaderboard(&state).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)),
        Err(err) => {
            record_error(&err);
            (
                err.status,
                Json(LeaderboardResponse {
                    rows: Vec::new(),
                    error_code: Some(err.code.to_string()),
                    reason: err.message,
                }),
            )
        }
    }
}

pub async fn admin_summary(State(state): State<AppState>) -> impl IntoResponse {
    match crud::admin_summary(&state).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)),
        Err(err) => {
            record_error(&err);
            (
                err.status,
                Json(AdminSummaryResponse {
                    participants: 0,
                    entries_pending: 0,
                    entries_approved: 0,
                    entries_rejected: 0,
                    total_steps: 0,
                    error_code: Some(err.code.to_string()),
                    reason: err.message,
                }),
            )
        }
    }
}

fn record_error(err: &AppError) {
    metrics_service::set_last_error_ts(Utc::now().timestamp());
    error!(error_code = err.code, reason = %err.message, "participant request failed");
}

fn error_register(err: AppError) -> (axum::http::StatusCode, Json<RegisterParticipantResponse>) {
    record_error(&err);
    (
        err.status,
        Json(RegisterParticipantResponse {
            accepted: false,
            participant: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_get(err: AppError) -> (axum::http::StatusCode, Json<GetParticipantResponse>) {
    record_error(&err);
    (
        err.status,
        Json(GetParticipantResponse {
            found: false,
            participant: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}
