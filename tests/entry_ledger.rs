mod common;

use common::{
    get_json, post_json, register, submit_counter_entry, submit_screenshot_entry, test_app,
};
use step_entry_ledger::module::participant::schema::GetParticipantResponse;
use step_entry_ledger::module::step_entry::model::EntryStatus;
use step_entry_ledger::module::step_entry::schema::{
    DeleteStepEntryResponse, EditStepEntryRequest, EditStepEntryResponse,
    GetStepEntriesByParticipantResponse, GetStepEntryResponse, ValidateStepEntryRequest,
    ValidateStepEntryResponse,
};

#[tokio::test]
async fn submitted_entry_counts_provisionally() {
    let app = test_app();
    let pid = register(app.clone(), "Ada", None).await;

    let (status, submitted) = submit_counter_entry(app.clone(), &pid, 5000).await;
    assert_eq!(status, http::StatusCode::OK);
    assert!(submitted.accepted);
    assert_eq!(submitted.status, Some(EntryStatus::Pending));

    let (_, fetched): (_, GetParticipantResponse) =
        get_json(app, &format!("/v1/participants/{pid}")).await;
    let participant = fetched.participant.expect("participant");
    assert_eq!(participant.total_steps, 5000);
    assert_eq!(participant.activities.len(), 1);
    assert!(participant.activities[0].message.contains("Pending validation"));
}

#[tokio::test]
async fn approval_does_not_double_count() {
    let app = test_app();
    let pid = register(app.clone(), "Bea", None).await;
    let (_, submitted) = submit_counter_entry(app.clone(), &pid, 5000).await;

    let (status, judged) = judge(app.clone(), &submitted.entry_id, EntryStatus::Approved, None).await;
    assert_eq!(status, http::StatusCode::OK);
    assert!(judged.updated);
    assert!(!judged.idempotent);

    let (_, fetched): (_, GetParticipantResponse) =
        get_json(app, &format!("/v1/participants/{pid}")).await;
    assert_eq!(fetched.participant.expect("participant").total_steps, 5000);
}

#[tokio::test]
async fn rejection_reverses_provisional_steps() {
    let app = test_app();
    let pid = register(app.clone(), "Cal", None).await;
    let (_, submitted) = submit_counter_entry(app.clone(), &pid, 4000).await;

    let (status, judged) = judge(
        app.clone(),
        &submitted.entry_id,
        EntryStatus::Rejected,
        Some("unreadable screenshot"),
    )
    .await;
    assert_eq!(status, http::StatusCode::OK);
    assert!(judged.updated);

    let (_, fetched): (_, GetParticipantResponse) =
        get_json(app, &format!("/v1/participants/{pid}")).await;
    let participant = fetched.participant.expect("participant");
    assert_eq!(participant.total_steps, 0);
    assert!(participant.daily_steps.is_empty());
}

#[tokio::test]
async fn reapproval_after_rejection_restores_steps() {
    let app = test_app();
    let pid = register(app.clone(), "Dee", None).await;
    let (_, submitted) = submit_counter_entry(app.clone(), &pid, 2000).await;

    let _ = judge(
        app.clone(),
        &submitted.entry_id,
        EntryStatus::Rejected,
        Some("wrong day"),
    )
    .await;
    let (_, judged) = judge(app.clone(), &submitted.entry_id, EntryStatus::Approved, None).await;
    assert!(judged.updated);

    let (_, fetched): (_, GetParticipantResponse) =
        get_json(app, &format!("/v1/participants/{pid}")).await;
    assert_eq!(fetched.participant.expect("participant").total_steps, 2000);
}

#[tokio::test]
async fn rejudging_to_same_status_is_idempotent() {
    let app = test_app();
    let pid = register(app.clone(), "Eve", None).await;
    let (_, submitted) = submit_counter_entry(app.clone(), &pid, 3000).await;

    let _ = judge(app.clone(), &submitted.entry_id, EntryStatus::Approved, None).await;
    let (status, second) = judge(app.clone(), &submitted.entry_id, EntryStatus::Approved, None).await;
    assert_eq!(status, http::StatusCode::OK);
    assert!(second.idempotent);

    let (_, fetched): (_, GetParticipantResponse) =
        get_json(app, &format!("/v1/participants/{pid}")).await;
    assert_eq!(fetched.participant.expect("participant").total_steps, 3000);
}

#[tokio::test]
async fn rejection_requires_notes() {
    let app = test_app();
    let pid = register(app.clone(), "Fin", None).await;
    let (_, submitted) = submit_counter_entry(app.clone(), &pid, 1000).await;

    let (status, judged) = judge(app, &submitted.entry_id, EntryStatus::Rejected, None).await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert_eq!(judged.error_code.as_deref(), Some("REJECTION_REQUIRES_NOTES"));
}

#[tokio::test]
async fn judging_back_to_pending_is_rejected() {
    let app = test_app();
    let pid = register(app.clone(), "Gus", None).await;
    let (_, submitted) = submit_counter_entry(app.clone(), &pid, 1000).await;

    let (status, judged) = judge(app, &submitted.entry_id, EntryStatus::Pending, None).await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert_eq!(judged.error_code.as_deref(), Some("INVALID_TARGET_STATUS"));
}

#[tokio::test]
async fn editing_approved_entry_forces_revalidation() {
    let app = test_app();
    let pid = register(app.clone(), "Hal", None).await;
    let (_, submitted) = submit_counter_entry(app.clone(), &pid, 5000).await;
    let _ = judge(app.clone(), &submitted.entry_id, EntryStatus::Approved, None).await;

    let (status, edited) = edit(app.clone(), &submitted.entry_id, 7000).await;
    assert_eq!(status, http::StatusCode::OK);
    assert!(edited.updated);
    assert_eq!(edited.previous_steps, 5000);
    let entry = edited.entry.expect("entry");
    assert_eq!(entry.status, EntryStatus::Pending);
    assert_eq!(entry.steps, 7000);
    assert!(entry.validated_by.is_none());

    let (_, fetched): (_, GetParticipantResponse) =
        get_json(app.clone(), &format!("/v1/participants/{pid}")).await;
    let participant = fetched.participant.expect("participant");
    assert_eq!(participant.total_steps, 7000);
    assert!(participant.activities[0]
        .message
        .contains("Steps updated: 5,000 -> 7,000"));

    // Re-approving the edited value must not change the total again.
    let _ = judge(app.clone(), &submitted.entry_id, EntryStatus::Approved, None).await;
    let (_, fetched): (_, GetParticipantResponse) =
        get_json(app, &format!("/v1/participants/{pid}")).await;
    assert_eq!(fetched.participant.expect("participant").total_steps, 7000);
}

#[tokio::test]
async fn editing_to_same_value_is_a_noop() {
    let app = test_app();
    let pid = register(app.clone(), "Ida", None).await;
    let (_, submitted) = submit_counter_entry(app.clone(), &pid, 4200).await;

    let (status, edited) = edit(app, &submitted.entry_id, 4200).await;
    assert_eq!(status, http::StatusCode::OK);
    assert!(!edited.updated);
    assert_eq!(edited.previous_steps, 4200);
}

#[tokio::test]
async fn editing_rejected_entry_leaves_aggregates_alone() {
    let app = test_app();
    let pid = register(app.clone(), "Jon", None).await;
    let (_, submitted) = submit_counter_entry(app.clone(), &pid, 6000).await;
    let _ = judge(
        app.clone(),
        &submitted.entry_id,
        EntryStatus::Rejected,
        Some("duplicate"),
    )
    .await;

    let (_, edited) = edit(app.clone(), &submitted.entry_id, 1234).await;
    assert!(edited.updated);
    assert_eq!(edited.entry.expect("entry").status, EntryStatus::Rejected);

    let (_, fetched): (_, GetParticipantResponse) =
        get_json(app, &format!("/v1/participants/{pid}")).await;
    assert_eq!(fetched.participant.expect("participant").total_steps, 0);
}

#[tokio::test]
async fn deleting_counted_entry_reverses_its_steps() {
    let app = test_app();
    let pid = register(app.clone(), "Kim", None).await;
    let (_, submitted) = submit_counter_entry(app.clone(), &pid, 3000).await;

    let (status, deleted): (_, DeleteStepEntryResponse) =
        common::delete_json(app.clone(), &format!("/v1/entries/{}", submitted.entry_id)).await;
    assert_eq!(status, http::StatusCode::OK);
    assert!(deleted.deleted);

    let (_, fetched): (_, GetParticipantResponse) =
        get_json(app.clone(), &format!("/v1/participants/{pid}")).await;
    let participant = fetched.participant.expect("participant");
    assert_eq!(participant.total_steps, 0);
    assert!(participant.activities.is_empty());

    let (status, lookup): (_, GetStepEntryResponse) =
        get_json(app, &format!("/v1/entries/{}", submitted.entry_id)).await;
    assert_eq!(status, http::StatusCode::NOT_FOUND);
    assert!(!lookup.found);
}

#[tokio::test]
async fn deleting_rejected_entry_does_not_touch_totals() {
    let app = test_app();
    let pid = register(app.clone(), "Lou", None).await;
    let (_, kept) = submit_counter_entry(app.clone(), &pid, 8000).await;
    let (_, doomed) = submit_counter_entry(app.clone(), &pid, 500).await;
    let _ = judge(
        app.clone(),
        &doomed.entry_id,
        EntryStatus::Rejected,
        Some("typo"),
    )
    .await;

    let (_, deleted): (_, DeleteStepEntryResponse) =
        common::delete_json(app.clone(), &format!("/v1/entries/{}", doomed.entry_id)).await;
    assert!(deleted.deleted);

    let (_, fetched): (_, GetParticipantResponse) =
        get_json(app, &format!("/v1/participants/{pid}")).await;
    assert_eq!(fetched.participant.expect("participant").total_steps, 8000);
    let _ = kept;
}

#[tokio::test]
async fn screenshot_is_required_for_manual_sources() {
    let app = test_app();
    let pid = register(app.clone(), "Mia", None).await;

    let req = step_entry_ledger::module::step_entry::schema::SubmitStepEntryRequest {
        participant_id: pid,
        steps: 1000,
        screenshot_base64: None,
        source: step_entry_ledger::module::step_entry::model::EntrySource::Manual,
    };
    let (status, resp): (
        _,
        step_entry_ledger::module::step_entry::schema::SubmitStepEntryResponse,
    ) = post_json(app, "/v1/entries", &req).await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_code.as_deref(), Some("SCREENSHOT_REQUIRED"));
}

#[tokio::test]
async fn screenshot_entry_records_content_hash() {
    let app = test_app();
    let pid = register(app.clone(), "Ned", None).await;

    let (status, submitted) =
        submit_screenshot_entry(app.clone(), &pid, 6162, "aGVhbHRoLWFwcC1zY3JlZW5zaG90").await;
    assert_eq!(status, http::StatusCode::OK);

    let (_, lookup): (_, GetStepEntryResponse) =
        get_json(app, &format!("/v1/entries/{}", submitted.entry_id)).await;
    let entry = lookup.entry.expect("entry");
    let hash = entry.screenshot_hash.expect("hash");
    assert_eq!(hash.len(), 64);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn submit_rejects_unknown_participant() {
    let app = test_app();
    let (status, resp) = submit_counter_entry(app, "user-missing", 100).await;
    assert_eq!(status, http::StatusCode::NOT_FOUND);
    assert_eq!(resp.error_code.as_deref(), Some("PARTICIPANT_NOT_FOUND"));
}

#[tokio::test]
async fn submit_rejects_non_positive_steps() {
    let app = test_app();
    let pid = register(app.clone(), "Oda", None).await;
    let (status, resp) = submit_counter_entry(app, &pid, 0).await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_code.as_deref(), Some("INVALID_STEPS"));
}

#[tokio::test]
async fn concurrent_submissions_keep_totals_exact() {
    let app = test_app();
    let pid = register(app.clone(), "Pam", None).await;

    let mut handles = Vec::new();
    for i in 1..=10i64 {
        let app = app.clone();
        let pid = pid.clone();
        handles.push(tokio::spawn(async move {
            let (status, _) = submit_counter_entry(app, &pid, i * 100).await;
            assert_eq!(status, http::StatusCode::OK);
        }));
    }
    for handle in handles {
        handle.await.expect("submission task");
    }

    // 100 + 200 + ... + 1000; interleaved submissions must not clobber
    // each other's credits.
    let (_, fetched): (_, GetParticipantResponse) =
        get_json(app.clone(), &format!("/v1/participants/{pid}")).await;
    let participant = fetched.participant.expect("participant");
    assert_eq!(participant.total_steps, 5500);
    assert_eq!(participant.activities.len(), 10);

    let (status, listed): (_, GetStepEntriesByParticipantResponse) =
        get_json(app, &format!("/v1/participants/{pid}/entries")).await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(listed.entries.len(), 10);
}

async fn judge(
    app: axum::Router,
    entry_id: &str,
    next_status: EntryStatus,
    notes: Option<&str>,
) -> (http::StatusCode, ValidateStepEntryResponse) {
    let req = ValidateStepEntryRequest {
        next_status,
        notes: notes.map(ToOwned::to_owned),
        validated_by: "admin-1".to_string(),
    };
    post_json(app, &format!("/v1/entries/{entry_id}/validate"), &req).await
}

async fn edit(
    app: axum::Router,
    entry_id: &str,
    new_steps: i64,
) -> (http::StatusCode, EditStepEntryResponse) {
    let req = EditStepEntryRequest {
        new_steps,
        modified_by: "admin-1".to_string(),
    };
    post_json(app, &format!("/v1/entries/{entry_id}/edit"), &req).await
}
