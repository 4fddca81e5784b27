use super::controller;
use crate::app::AppState;
use axum::routing::{get, post};
use axum::Router;

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/participants", post(controller::register_participant))
        .route(
            "/v1/participants/:participant_id",
            get(controller::get_participant).delete(controller::delete_participant),
        )
        .route(
            "/v1/participants/:participant_id/entries",
            get(controller::get_participant_entries),
        )
        .route(
            "/v1/participants/:participant_id/streak",
            get(controller::get_streak),
        )
        .route("/v1/leaderboard", get(controller::leaderboard))
        .route("/v1/admin/summary", get(controller::admin_summary))
        .with_state(state)
}
