mod common;

use common::{delete_json, get_json, post_json, register, submit_counter_entry, test_app};
use step_entry_ledger::module::participant::schema::{
    AdminSummaryResponse, DeleteParticipantResponse, GetParticipantResponse,
    RegisterParticipantRequest, RegisterParticipantResponse,
};
use step_entry_ledger::module::step_entry::model::EntryStatus;
use step_entry_ledger::module::step_entry::schema::{
    GetStepEntriesByParticipantResponse, GetStepEntryResponse, HealthResponse,
    ValidateStepEntryRequest, ValidateStepEntryResponse,
};

#[tokio::test]
async fn register_accepts_minimal_payload() {
    let app = test_app();
    let req = RegisterParticipantRequest {
        name: "Pat".to_string(),
        email: None,
        employee_id: None,
        auth_uid: None,
    };
    let (status, resp): (_, RegisterParticipantResponse) =
        post_json(app, "/v1/participants", &req).await;
    assert_eq!(status, http::StatusCode::OK);
    assert!(resp.accepted);
    let participant = resp.participant.expect("participant");
    assert!(participant.participant_id.starts_with("user-"));
    assert_eq!(participant.total_steps, 0);
}

#[tokio::test]
async fn register_rejects_blank_name() {
    let app = test_app();
    let req = RegisterParticipantRequest {
        name: "   ".to_string(),
        email: None,
        employee_id: None,
        auth_uid: None,
    };
    let (status, resp): (_, RegisterParticipantResponse) =
        post_json(app, "/v1/participants", &req).await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_code.as_deref(), Some("INVALID_NAME"));
}

#[tokio::test]
async fn register_rejects_duplicate_alias() {
    let app = test_app();
    let _ = register(app.clone(), "Quin", Some("quin@example.com")).await;

    let req = RegisterParticipantRequest {
        name: "Quin Again".to_string(),
        email: Some("quin@example.com".to_string()),
        employee_id: None,
        auth_uid: None,
    };
    let (status, resp): (_, RegisterParticipantResponse) =
        post_json(app, "/v1/participants", &req).await;
    assert_eq!(status, http::StatusCode::CONFLICT);
    assert_eq!(resp.error_code.as_deref(), Some("ALIAS_IN_USE"));
}

#[tokio::test]
async fn participant_is_reachable_by_email_alias() {
    let app = test_app();
    let pid = register(app.clone(), "Rio", Some("rio@example.com")).await;

    let (status, fetched): (_, GetParticipantResponse) =
        get_json(app, "/v1/participants/rio@example.com").await;
    assert_eq!(status, http::StatusCode::OK);
    assert!(fetched.found);
    assert_eq!(fetched.participant.expect("participant").participant_id, pid);
}

#[tokio::test]
async fn unknown_participant_lookup_reports_not_found() {
    let app = test_app();
    let (status, fetched): (_, GetParticipantResponse) =
        get_json(app, "/v1/participants/user-nope").await;
    assert_eq!(status, http::StatusCode::NOT_FOUND);
    assert!(!fetched.found);
    assert_eq!(fetched.error_code.as_deref(), Some("PARTICIPANT_NOT_FOUND"));
}

#[tokio::test]
async fn entries_listing_returns_newest_first() {
    let app = test_app();
    let pid = register(app.clone(), "Sam", None).await;
    let (_, first) = submit_counter_entry(app.clone(), &pid, 1000).await;
    let (_, second) = submit_counter_entry(app.clone(), &pid, 2000).await;

    let (status, listing): (_, GetStepEntriesByParticipantResponse) =
        get_json(app, &format!("/v1/participants/{pid}/entries")).await;
    assert_eq!(status, http::StatusCode::OK);
    assert!(listing.found);
    assert_eq!(listing.entries.len(), 2);
    let ids: Vec<&str> = listing.entries.iter().map(|e| e.entry_id.as_str()).collect();
    assert!(ids.contains(&first.entry_id.as_str()));
    assert!(ids.contains(&second.entry_id.as_str()));
    assert!(listing.entries[0].submitted_at >= listing.entries[1].submitted_at);
}

#[tokio::test]
async fn deleting_participant_cascades_to_entries() {
    let app = test_app();
    let pid = register(app.clone(), "Tia", Some("tia@example.com")).await;
    let other = register(app.clone(), "Uma", None).await;
    let (_, doomed) = submit_counter_entry(app.clone(), &pid, 4000).await;
    let (_, kept) = submit_counter_entry(app.clone(), &other, 9000).await;

    let (status, deleted): (_, DeleteParticipantResponse) =
        delete_json(app.clone(), &format!("/v1/participants/{pid}")).await;
    assert_eq!(status, http::StatusCode::OK);
    assert!(deleted.deleted);
    assert_eq!(deleted.entries_removed, 1);

    let (_, gone): (_, GetParticipantResponse) =
        get_json(app.clone(), &format!("/v1/participants/{pid}")).await;
    assert!(!gone.found);
    let (_, entry_gone): (_, GetStepEntryResponse) =
        get_json(app.clone(), &format!("/v1/entries/{}", doomed.entry_id)).await;
    assert!(!entry_gone.found);

    // The freed alias is reusable.
    let _ = register(app.clone(), "Tia II", Some("tia@example.com")).await;

    let (_, untouched): (_, GetParticipantResponse) =
        get_json(app.clone(), &format!("/v1/participants/{other}")).await;
    assert_eq!(untouched.participant.expect("participant").total_steps, 9000);
    let (_, kept_entry): (_, GetStepEntryResponse) =
        get_json(app, &format!("/v1/entries/{}", kept.entry_id)).await;
    assert!(kept_entry.found);
}

#[tokio::test]
async fn deleting_unknown_participant_reports_not_found() {
    let app = test_app();
    let (status, resp): (_, DeleteParticipantResponse) =
        delete_json(app, "/v1/participants/user-ghost").await;
    assert_eq!(status, http::StatusCode::NOT_FOUND);
    assert_eq!(resp.error_code.as_deref(), Some("PARTICIPANT_NOT_FOUND"));
}

#[tokio::test]
async fn admin_summary_counts_entries_by_status() {
    let app = test_app();
    let pid = register(app.clone(), "Val", None).await;
    let (_, pending) = submit_counter_entry(app.clone(), &pid, 1000).await;
    let (_, approved) = submit_counter_entry(app.clone(), &pid, 2000).await;
    let (_, rejected) = submit_counter_entry(app.clone(), &pid, 3000).await;

    let judge = |entry_id: String, next_status, notes: Option<&str>| {
        let app = app.clone();
        let notes = notes.map(ToOwned::to_owned);
        async move {
            let req = ValidateStepEntryRequest {
                next_status,
                notes,
                validated_by: "admin-1".to_string(),
            };
            let (_, resp): (_, ValidateStepEntryResponse) =
                post_json(app, &format!("/v1/entries/{entry_id}/validate"), &req).await;
            resp
        }
    };
    let _ = judge(approved.entry_id, EntryStatus::Approved, None).await;
    let _ = judge(rejected.entry_id, EntryStatus::Rejected, Some("blurred")).await;
    let _ = pending;

    let (status, summary): (_, AdminSummaryResponse) = get_json(app, "/v1/admin/summary").await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(summary.participants, 1);
    assert_eq!(summary.entries_pending, 1);
    assert_eq!(summary.entries_approved, 1);
    assert_eq!(summary.entries_rejected, 1);
    // 1000 pending + 2000 approved still count; the rejected 3000 does not.
    assert_eq!(summary.total_steps, 3000);
}

#[tokio::test]
async fn health_reports_ok_without_redis() {
    let app = test_app();
    let (status, health): (_, HealthResponse) = get_json(app, "/v1/health").await;
    assert_eq!(status, http::StatusCode::OK);
    assert!(health.ok);
    assert!(!health.redis_available);
    assert!(!health.ocr_available);
}
