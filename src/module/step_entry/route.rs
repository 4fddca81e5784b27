use super::controller;
use crate::app::AppState;
use axum::routing::{get, post};
use axum::Router;

pub fn register_routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/entries", post(controller::submit_step_entry))
        .route(
            "/v1/entries/:entry_id",
            get(controller::get_step_entry).delete(controller::delete_step_entry),
        )
        .route(
            "/v1/entries/:entry_id/validate",
            post(controller::validate_step_entry),
        )
        .route(
            "/v1/entries/:entry_id/edit",
            post(controller::edit_step_entry),
        )
        .route("/v1/extract", post(controller::extract_steps))
        .route(
            "/v1/extract/image",
            post(controller::extract_steps_from_image),
        )
        .route("/v1/steps/count", post(controller::count_motion_steps))
        .route("/v1/health", get(controller::health))
        .with_state(state)
}
