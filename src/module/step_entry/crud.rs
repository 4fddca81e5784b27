use super::error::AppError;
use super::model::{EntryStatus, StepEntryRecord};
use super::schema::{
    DeleteStepEntryResponse, EditStepEntryRequest, EditStepEntryResponse,
    GetStepEntriesByParticipantResponse, GetStepEntryResponse, StepEntryView,
    SubmitStepEntryRequest, SubmitStepEntryResponse, ValidateStepEntryRequest,
    ValidateStepEntryResponse,
};
use crate::app::AppState;
use crate::infra::{PARTICIPANTS_COLLECTION, SCREENSHOTS_COLLECTION, STEP_ENTRIES_COLLECTION};
use crate::module::participant::model::ParticipantRecord;
use crate::service::activity_service;
use crate::service::hash_service::sha256_hex;
use crate::service::id_service::generate_entry_id;
use crate::service::metrics_service;
use crate::service::streak_service::day_key;
use crate::service::validation_service::{
    validate_edit_request, validate_judgement_request, validate_submit_request,
};
use chrono::Utc;
use redis::AsyncCommands;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Authoritative in-memory ledger. Owns every step entry and is the only
/// writer of participant aggregates; Redis, when configured, is a mirror
/// kept in sync by the operations below.
#[derive(Debug, Default)]
pub struct LedgerStore {
    pub(crate) inner: Mutex<LedgerInner>,
    /// Held across every mutate+persist sequence. Rollback restores
    /// pre-operation snapshots, and mirror writes are last-writer-wins per
    /// key, so writes must not interleave between staging and persisting.
    pub(crate) write_gate: tokio::sync::Mutex<()>,
}

#[derive(Debug, Default)]
pub(crate) struct LedgerInner {
    pub(crate) participants_by_id: HashMap<String, ParticipantRecord>,
    pub(crate) alias_index: HashMap<String, String>,
    pub(crate) entries_by_id: HashMap<String, StepEntryRecord>,
    pub(crate) screenshots_by_hash: HashMap<String, String>,
    pub(crate) next_sequence: u64,
}

pub async fn submit_step_entry(
    state: &AppState,
    req: SubmitStepEntryRequest,
) -> Result<SubmitStepEntryResponse, AppError> {
    validate_submit_request(&req)?;
    let _gate = state.store.write_gate.lock().await;
    let steps = req.steps as u64;
    let screenshot = req
        .screenshot_base64
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| (sha256_hex(s), s.to_string()));

    let participant_id = resolve_participant(state, req.participant_id.trim()).await?;

    let now = Utc::now().timestamp();
    let day = day_key(now);
    let (entry, previous_participant, updated_participant, blob_inserted) = {
        let mut inner = lock_store(&state.store)?;
        let participant = inner
            .participants_by_id
            .get_mut(&participant_id)
            .ok_or_else(participant_not_found)?;
        let previous = participant.clone();

        let entry = StepEntryRecord {
            entry_id: generate_entry_id(),
            participant_id: participant_id.clone(),
            steps,
            screenshot_hash: screenshot.as_ref().map(|(hash, _)| hash.clone()),
            source: req.source,
            submitted_at: now,
            day: day.clone(),
            status: EntryStatus::Pending,
            validated_by: None,
            validated_at: None,
            notes: None,
            last_modified_by: None,
            last_modified_at: None,
        };

        // Provisional counting: pending steps show on the submitter's own
        // dashboard immediately and stay until a rejection reverses them.
        credit_steps(participant, &day, steps);
        participant.updated_at = now;
        participant.last_activity_at = Some(now);
        activity_service::push_activity(
            participant,
            &entry.entry_id,
            steps,
            activity_service::submission_message(steps, req.source),
        );
        let updated = participant.clone();

        let mut blob_inserted = false;
        if let Some((hash, blob)) = &screenshot {
            blob_inserted = inner
                .screenshots_by_hash
                .insert(hash.clone(), blob.clone())
                .is_none();
        }
        inner.entries_by_id.insert(entry.entry_id.clone(), entry.clone());
        (entry, previous, updated, blob_inserted)
    };

    if let Err(err) =
        persist_entry_and_participant(state, &entry, &updated_participant, screenshot.as_ref())
            .await
    {
        let mut inner = lock_store(&state.store)?;
        inner.entries_by_id.remove(&entry.entry_id);
        if blob_inserted {
            if let Some((hash, _)) = &screenshot {
                inner.screenshots_by_hash.remove(hash);
            }
        }
        inner
            .participants_by_id
            .insert(previous_participant.participant_id.clone(), previous_participant);
        return Err(err);
    }

    metrics_service::inc_entries_submitted();

    Ok(SubmitStepEntryResponse {
        accepted: true,
        entry_id: entry.entry_id,
        participant_id,
        steps,
        status: Some(EntryStatus::Pending),
        day,
        error_code: None,
        reason: "step entry accepted and pending validation".to_string(),
    })
}

pub async fn get_step_entry(
    state: &AppState,
    entry_id: &str,
) -> Result<GetStepEntryResponse, AppError> {
    if let Some(entry) = get_local_entry(state, entry_id)? {
        return Ok(found_entry_response(&entry));
    }
    if let Some(entry) = load_entry_from_redis(state, entry_id).await? {
        warm_entry_in_memory(state, &entry)?;
        return Ok(found_entry_response(&entry));
    }
    Err(entry_not_found())
}

pub async fn get_entries_by_participant(
    state: &AppState,
    participant_key: &str,
) -> Result<GetStepEntriesByParticipantResponse, AppError> {
    if participant_key.trim().is_empty() {
        return Err(AppError::bad_request(
            "INVALID_PARTICIPANT_ID",
            "participant_id is required",
        ));
    }
    let participant_id = resolve_participant(state, participant_key.trim()).await?;

    let mut by_id: HashMap<String, StepEntryRecord> = HashMap::new();
    {
        let inner = lock_store(&state.store)?;
        for entry in inner.entries_by_id.values() {
            if entry.participant_id == participant_id {
                by_id.insert(entry.entry_id.clone(), entry.clone());
            }
        }
    }

    if let Some(infra) = &state.infra {
        let mut conn = connect(infra).await?;
        let index_key = participant_entries_key(&participant_id);
        let entry_ids: Vec<String> = conn
            .smembers(index_key)
            .await
            .map_err(|e| AppError::internal("REDIS_QUERY_FAILED", e.to_string()))?;
        for entry_id in entry_ids {
            if by_id.contains_key(&entry_id) {
                continue;
            }
            if let Some(entry) = load_entry_from_redis(state, &entry_id).await? {
                by_id.insert(entry.entry_id.clone(), entry);
            }
        }
    }

    let mut entries = by_id
        .into_values()
        .map(|e| StepEntryView::from_record(&e))
        .collect::<Vec<_>>();
    entries.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    let found = !entries.is_empty();
    Ok(GetStepEntriesByParticipantResponse {
        found,
        participant_id,
        entries,
        error_code: None,
        reason: if found {
            "step entries found".to_string()
        } else {
            "no step entries found for participant".to_string()
        },
    })
}

pub async fn validate_step_entry(
    state: &AppState,
    entry_id: &str,
    req: ValidateStepEntryRequest,
) -> Result<ValidateStepEntryResponse, AppError> {
    validate_judgement_request(&req)?;
    let _gate = state.store.write_gate.lock().await;
    let existing = get_entry_record(state, entry_id).await?;
    let _ = get_participant_record(state, &existing.participant_id).await?;

    let now = Utc::now().timestamp();
    let (updated_entry, previous_entry, previous_participant, updated_participant, idempotent) = {
        let mut inner = lock_store(&state.store)?;
        let previous_entry = inner
            .entries_by_id
            .get(entry_id)
            .ok_or_else(entry_not_found)?
            .clone();
        let previous_participant = inner
            .participants_by_id
            .get(&previous_entry.participant_id)
            .ok_or_else(participant_not_found)?
            .clone();

        let idempotent = previous_entry.status == req.next_status;

        let mut updated_entry = previous_entry.clone();
        updated_entry.status = req.next_status;
        updated_entry.validated_by = Some(req.validated_by.trim().to_string());
        updated_entry.validated_at = Some(now);
        updated_entry.notes = req
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(ToOwned::to_owned);

        // Aggregates move on the transition, not the target state: pending
        // steps were already counted at submission time.
        let mut updated_participant = previous_participant.clone();
        match (previous_entry.status, req.next_status) {
            (EntryStatus::Pending, EntryStatus::Rejected)
            | (EntryStatus::Approved, EntryStatus::Rejected) => {
                debit_steps(&mut updated_participant, &previous_entry.day, previous_entry.steps);
            }
            (EntryStatus::Rejected, EntryStatus::Approved) => {
                credit_steps(&mut updated_participant, &previous_entry.day, previous_entry.steps);
            }
            _ => {}
        }
        updated_participant.updated_at = now;
        activity_service::rewrite_activity(
            &mut updated_participant,
            entry_id,
            activity_service::validation_message(
                previous_entry.steps,
                previous_entry.status,
                req.next_status,
            ),
        );

        inner
            .entries_by_id
            .insert(entry_id.to_string(), updated_entry.clone());
        inner.participants_by_id.insert(
            updated_participant.participant_id.clone(),
            updated_participant.clone(),
        );
        (
            updated_entry,
            previous_entry,
            previous_participant,
            updated_participant,
            idempotent,
        )
    };

    if let Err(err) =
        persist_entry_and_participant(state, &updated_entry, &updated_participant, None).await
    {
        restore(state, previous_entry, previous_participant)?;
        return Err(err);
    }

    if !idempotent {
        match req.next_status {
            EntryStatus::Approved => metrics_service::inc_entries_approved(),
            EntryStatus::Rejected => metrics_service::inc_entries_rejected(),
            EntryStatus::Pending => {}
        }
    }

    Ok(ValidateStepEntryResponse {
        updated: true,
        idempotent,
        entry: Some(StepEntryView::from_record(&updated_entry)),
        error_code: None,
        reason: if idempotent {
            "entry re-judged with no status change".to_string()
        } else {
            "entry status updated".to_string()
        },
    })
}

pub async fn edit_step_entry(
    state: &AppState,
    entry_id: &str,
    req: EditStepEntryRequest,
) -> Result<EditStepEntryResponse, AppError> {
    validate_edit_request(&req)?;
    let _gate = state.store.write_gate.lock().await;
    let new_steps = req.new_steps as u64;
    let existing = get_entry_record(state, entry_id).await?;
    let _ = get_participant_record(state, &existing.participant_id).await?;

    let now = Utc::now().timestamp();
    let staged = {
        let mut inner = lock_store(&state.store)?;
        let previous_entry = inner
            .entries_by_id
            .get(entry_id)
            .ok_or_else(entry_not_found)?
            .clone();
        if previous_entry.steps == new_steps {
            return Ok(EditStepEntryResponse {
                updated: false,
                previous_steps: previous_entry.steps,
                entry: Some(StepEntryView::from_record(&previous_entry)),
                error_code: None,
                reason: "step count unchanged".to_string(),
            });
        }
        let previous_participant = inner
            .participants_by_id
            .get(&previous_entry.participant_id)
            .ok_or_else(participant_not_found)?
            .clone();

        let mut updated_entry = previous_entry.clone();
        updated_entry.steps = new_steps;
        updated_entry.last_modified_by = Some(req.modified_by.trim().to_string());
        updated_entry.last_modified_at = Some(now);

        let mut updated_participant = previous_participant.clone();
        match previous_entry.status {
            EntryStatus::Approved => {
                // Editing an approved entry revokes the approval: the old
                // value comes out, the new value goes back in provisionally
                // and waits for a fresh judgement.
                debit_steps(&mut updated_participant, &previous_entry.day, previous_entry.steps);
                credit_steps(&mut updated_participant, &previous_entry.day, new_steps);
                updated_entry.status = EntryStatus::Pending;
                updated_entry.validated_by = None;
                updated_entry.validated_at = None;
                updated_entry.notes = None;
                activity_service::rewrite_activity(
                    &mut updated_participant,
                    entry_id,
                    activity_service::edit_message(previous_entry.steps, new_steps),
                );
            }
            EntryStatus::Pending => {
                debit_steps(&mut updated_participant, &previous_entry.day, previous_entry.steps);
                credit_steps(&mut updated_participant, &previous_entry.day, new_steps);
            }
            EntryStatus::Rejected => {}
        }
        updated_participant.updated_at = now;

        inner
            .entries_by_id
            .insert(entry_id.to_string(), updated_entry.clone());
        inner.participants_by_id.insert(
            updated_participant.participant_id.clone(),
            updated_participant.clone(),
        );
        (
            updated_entry,
            previous_entry,
            previous_participant,
            updated_participant,
        )
    };
    let (updated_entry, previous_entry, previous_participant, updated_participant) = staged;

    if let Err(err) =
        persist_entry_and_participant(state, &updated_entry, &updated_participant, None).await
    {
        restore(state, previous_entry, previous_participant)?;
        return Err(err);
    }

    metrics_service::inc_entries_edited();

    Ok(EditStepEntryResponse {
        updated: true,
        previous_steps: previous_entry.steps,
        entry: Some(StepEntryView::from_record(&updated_entry)),
        error_code: None,
        reason: "step count updated".to_string(),
    })
}

pub async fn delete_step_entry(
    state: &AppState,
    entry_id: &str,
) -> Result<DeleteStepEntryResponse, AppError> {
    let _gate = state.store.write_gate.lock().await;
    let existing = get_entry_record(state, entry_id).await?;
    // The owner may already be gone (cascade interrupted); the entry is
    // removed either way.
    let _ = get_participant_record(state, &existing.participant_id).await;

    let now = Utc::now().timestamp();
    let (previous_entry, previous_participant, updated_participant, removed_blob) = {
        let mut inner = lock_store(&state.store)?;
        let previous_entry = inner
            .entries_by_id
            .get(entry_id)
            .ok_or_else(entry_not_found)?
            .clone();
        let previous_participant = inner
            .participants_by_id
            .get(&previous_entry.participant_id)
            .cloned();

        let updated_participant = previous_participant.clone().map(|mut p| {
            if previous_entry.status.is_counted() {
                debit_steps(&mut p, &previous_entry.day, previous_entry.steps);
            }
            activity_service::remove_activity(&mut p, entry_id);
            p.updated_at = now;
            p
        });

        inner.entries_by_id.remove(entry_id);
        let removed_blob = previous_entry
            .screenshot_hash
            .as_ref()
            .and_then(|hash| inner.screenshots_by_hash.remove(hash).map(|b| (hash.clone(), b)));
        if let Some(p) = &updated_participant {
            inner
                .participants_by_id
                .insert(p.participant_id.clone(), p.clone());
        }
        (previous_entry, previous_participant, updated_participant, removed_blob)
    };

    if let Err(err) =
        persist_entry_delete(state, &previous_entry, updated_participant.as_ref()).await
    {
        let mut inner = lock_store(&state.store)?;
        inner
            .entries_by_id
            .insert(previous_entry.entry_id.clone(), previous_entry);
        if let Some((hash, blob)) = removed_blob {
            inner.screenshots_by_hash.insert(hash, blob);
        }
        if let Some(p) = previous_participant {
            inner.participants_by_id.insert(p.participant_id.clone(), p);
        }
        return Err(err);
    }

    metrics_service::inc_entries_deleted();

    Ok(DeleteStepEntryResponse {
        deleted: true,
        entry_id: entry_id.to_string(),
        error_code: None,
        reason: "step entry deleted".to_string(),
    })
}

pub async fn get_entry_record(
    state: &AppState,
    entry_id: &str,
) -> Result<StepEntryRecord, AppError> {
    if let Some(entry) = get_local_entry(state, entry_id)? {
        return Ok(entry);
    }
    if let Some(entry) = load_entry_from_redis(state, entry_id).await? {
        warm_entry_in_memory(state, &entry)?;
        return Ok(entry);
    }
    Err(entry_not_found())
}

pub async fn get_participant_record(
    state: &AppState,
    participant_key: &str,
) -> Result<ParticipantRecord, AppError> {
    {
        let inner = lock_store(&state.store)?;
        if let Some(id) = resolve_participant_id(&inner, participant_key) {
            if let Some(participant) = inner.participants_by_id.get(&id) {
                return Ok(participant.clone());
            }
        }
    }
    if let Some(participant) = load_participant_from_redis(state, participant_key).await? {
        warm_participant_in_memory(state, &participant)?;
        return Ok(participant);
    }
    Err(participant_not_found())
}

async fn resolve_participant(state: &AppState, key: &str) -> Result<String, AppError> {
    Ok(get_participant_record(state, key).await?.participant_id)
}

// ---- in-memory helpers ----

pub(crate) fn lock_store(store: &LedgerStore) -> Result<MutexGuard<'_, LedgerInner>, AppError> {
    store
        .inner
        .lock()
        .map_err(|_| AppError::internal("STORE_LOCK_ERROR", "ledger store lock poisoned"))
}

pub(crate) fn resolve_participant_id(inner: &LedgerInner, key: &str) -> Option<String> {
    if inner.participants_by_id.contains_key(key) {
        return Some(key.to_string());
    }
    inner.alias_index.get(key).cloned()
}

pub(crate) fn index_participant(inner: &mut LedgerInner, participant: &ParticipantRecord) {
    inner.next_sequence = inner.next_sequence.max(participant.sequence + 1);
    for alias in participant.aliases() {
        inner
            .alias_index
            .insert(alias, participant.participant_id.clone());
    }
    inner
        .participants_by_id
        .insert(participant.participant_id.clone(), participant.clone());
}

pub(crate) fn credit_steps(participant: &mut ParticipantRecord, day: &str, steps: u64) {
    *participant.daily_steps.entry(day.to_string()).or_insert(0) += steps;
    participant.total_steps += steps;
}

pub(crate) fn debit_steps(participant: &mut ParticipantRecord, day: &str, steps: u64) {
    if let Some(bucket) = participant.daily_steps.get_mut(day) {
        *bucket = bucket.saturating_sub(steps);
        if *bucket == 0 {
            participant.daily_steps.remove(day);
        }
    }
    participant.total_steps = participant.total_steps.saturating_sub(steps);
}

fn get_local_entry(state: &AppState, entry_id: &str) -> Result<Option<StepEntryRecord>, AppError> {
    let inner = lock_store(&state.store)?;
    Ok(inner.entries_by_id.get(entry_id).cloned())
}

fn warm_entry_in_memory(state: &AppState, entry: &StepEntryRecord) -> Result<(), AppError> {
    let mut inner = lock_store(&state.store)?;
    inner
        .entries_by_id
        .entry(entry.entry_id.clone())
        .or_insert_with(|| entry.clone());
    Ok(())
}

pub(crate) fn warm_participant_in_memory(
    state: &AppState,
    participant: &ParticipantRecord,
) -> Result<(), AppError> {
    let mut inner = lock_store(&state.store)?;
    if !inner
        .participants_by_id
        .contains_key(&participant.participant_id)
    {
        index_participant(&mut inner, participant);
    }
    Ok(())
}

fn restore(
    state: &AppState,
    entry: StepEntryRecord,
    participant: ParticipantRecord,
) -> Result<(), AppError> {
    let mut inner = lock_store(&state.store)?;
    inner.entries_by_id.insert(entry.entry_id.clone(), entry);
    inner
        .participants_by_id
        .insert(participant.participant_id.clone(), participant);
    Ok(())
}

fn found_entry_response(entry: &StepEntryRecord) -> GetStepEntryResponse {
    GetStepEntryResponse {
        found: true,
        entry: Some(StepEntryView::from_record(entry)),
        error_code: None,
        reason: "step entry found".to_string(),
    }
}

fn entry_not_found() -> AppError {
    AppError::not_found("ENTRY_NOT_FOUND", "step entry not found")
}

fn participant_not_found() -> AppError {
    AppError::not_found("PARTICIPANT_NOT_FOUND", "participant not found")
}

// ---- redis mirror ----

pub(crate) fn entry_key(entry_id: &str) -> String {
    format!("{STEP_ENTRIES_COLLECTION}:{entry_id}")
}

pub(crate) fn participant_entries_key(participant_id: &str) -> String {
    format!("{STEP_ENTRIES_COLLECTION}:participant:{participant_id}")
}

pub(crate) fn participant_key(participant_id: &str) -> String {
    format!("{PARTICIPANTS_COLLECTION}:{participant_id}")
}

pub(crate) fn participant_alias_key(alias: &str) -> String {
    format!("{PARTICIPANTS_COLLECTION}:alias:{alias}")
}

pub(crate) fn participants_all_key() -> String {
    format!("{PARTICIPANTS_COLLECTION}:all")
}

pub(crate) fn screenshot_key(hash: &str) -> String {
    format!("{SCREENSHOTS_COLLECTION}:{hash}")
}

pub(crate) async fn connect(
    infra: &crate::infra::InfraClients,
) -> Result<redis::aio::MultiplexedConnection, AppError> {
    infra
        .redis
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| AppError::internal("REDIS_CONNECT_FAILED", e.to_string()))
}

pub(crate) fn encode<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string(value)
        .map_err(|e| AppError::internal("SERIALIZATION_ERROR", e.to_string()))
}

/// One ledger mutation, one atomic pipeline: the mirror never sees an entry
/// whose participant aggregates were not written in the same step.
async fn persist_entry_and_participant(
    state: &AppState,
    entry: &StepEntryRecord,
    participant: &ParticipantRecord,
    screenshot: Option<&(String, String)>,
) -> Result<(), AppError> {
    let Some(infra) = &state.infra else {
        return Ok(());
    };
    let mut conn = connect(infra).await?;
    let mut pipe = redis::pipe();
    pipe.atomic();
    pipe.set(entry_key(&entry.entry_id), encode(entry)?).ignore();
    pipe.sadd(participant_entries_key(&entry.participant_id), &entry.entry_id)
        .ignore();
    pipe.set(
        participant_key(&participant.participant_id),
        encode(participant)?,
    )
    .ignore();
    if let Some((hash, blob)) = screenshot {
        pipe.set(screenshot_key(hash), blob).ignore();
    }
    let _: () = pipe
        .query_async(&mut conn)
        .await
        .map_err(|e| AppError::internal("REDIS_WRITE_FAILED", e.to_string()))?;
    Ok(())
}

async fn persist_entry_delete(
    state: &AppState,
    entry: &StepEntryRecord,
    participant: Option<&ParticipantRecord>,
) -> Result<(), AppError> {
    let Some(infra) = &state.infra else {
        return Ok(());
    };
    let mut conn = connect(infra).await?;
    let mut pipe = redis::pipe();
    pipe.atomic();
    pipe.del(entry_key(&entry.entry_id)).ignore();
    pipe.srem(participant_entries_key(&entry.participant_id), &entry.entry_id)
        .ignore();
    if let Some(hash) = &entry.screenshot_hash {
        pipe.del(screenshot_key(hash)).ignore();
    }
    if let Some(participant) = participant {
        pipe.set(
            participant_key(&participant.participant_id),
            encode(participant)?,
        )
        .ignore();
    }
    let _: () = pipe
        .query_async(&mut conn)
        .await
        .map_err(|e| AppError::internal("REDIS_WRITE_FAILED", e.to_string()))?;
    Ok(())
}

async fn load_entry_from_redis(
    state: &AppState,
    entry_id: &str,
) -> Result<Option<StepEntryRecord>, AppError> {
    let Some(infra) = &state.infra else {
        return Ok(None);
    };
    let mut conn = connect(infra).await?;
    let raw: Option<String> = conn
        .get(entry_key(entry_id))
        .await
        .map_err(|e| AppError::internal("REDIS_QUERY_FAILED", e.to_string()))?;
    raw.map(|s| serde_json::from_str::<StepEntryRecord>(&s))
        .transpose()
        .map_err(|e| AppError::internal("REDIS_DECODE_FAILED", e.to_string()))
}

pub(crate) async fn load_participant_from_redis(
    state: &AppState,
    participant_key_or_alias: &str,
) -> Result<Option<ParticipantRecord>, AppError> {
    let Some(infra) = &state.infra else {
        return Ok(None);
    };
    let mut conn = connect(infra).await?;
    let direct: Option<String> = conn
        .get(participant_key(participant_key_or_alias))
        .await
        .map_err(|e| AppError::internal("REDIS_QUERY_FAILED", e.to_string()))?;
    let raw = match direct {
        Some(raw) => Some(raw),
        None => {
            let aliased: Option<String> = conn
                .get(participant_alias_key(participant_key_or_alias))
                .await
                .map_err(|e| AppError::internal("REDIS_QUERY_FAILED", e.to_string()))?;
            match aliased {
                Some(participant_id) => conn
                    .get(participant_key(&participant_id))
                    .await
                    .map_err(|e| AppError::internal("REDIS_QUERY_FAILED", e.to_string()))?,
                None => None,
            }
        }
    };
    raw.map(|s| serde_json::from_str::<ParticipantRecord>(&s))
        .transpose()
        .map_err(|e| AppError::internal("REDIS_DECODE_FAILED", e.to_string()))
}
