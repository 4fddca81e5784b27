use super::model::ParticipantRecord;
use super::schema::{
    AdminSummaryResponse, DeleteParticipantResponse, GetParticipantResponse, GetStreakResponse,
    LeaderboardResponse, LeaderboardRow, ParticipantView, RegisterParticipantRequest,
    RegisterParticipantResponse,
};
use crate::app::AppState;
use crate::module::step_entry::crud::{
    self, connect, encode, entry_key, get_participant_record, index_participant, lock_store,
    participant_alias_key, participant_entries_key, participant_key, participants_all_key,
    screenshot_key,
};
use crate::module::step_entry::error::AppError;
use crate::module::step_entry::model::{EntryStatus, StepEntryRecord};
use crate::service::id_service::generate_participant_id;
use crate::service::metrics_service;
use crate::service::streak_service::{calculate_streak, goal_days, today_utc};
use crate::service::validation_service::validate_register_request;
use chrono::Utc;
use redis::AsyncCommands;
use std::collections::HashSet;

pub async fn register_participant(
    state: &AppState,
    req: RegisterParticipantRequest,
) -> Result<RegisterParticipantResponse, AppError> {
    validate_register_request(&req)?;
    let _gate = state.store.write_gate.lock().await;
    let now = Utc::now().timestamp();
    let mut participant = ParticipantRecord {
        participant_id: generate_participant_id(),
        name: req.name.trim().to_string(),
        email: normalize_alias(req.email.as_deref()).map(|a| a.to_lowercase()),
        employee_id: normalize_alias(req.employee_id.as_deref()),
        auth_uid: normalize_alias(req.auth_uid.as_deref()),
        total_steps: 0,
        daily_steps: Default::default(),
        activities: Vec::new(),
        sequence: 0,
        created_at: now,
        updated_at: now,
        last_activity_at: None,
    };

    // The mirror may know aliases this process has never warmed.
    for alias in participant.aliases() {
        if crud::load_participant_from_redis(state, &alias).await?.is_some() {
            return Err(alias_in_use(&alias));
        }
    }

    {
        let mut inner = lock_store(&state.store)?;
        for alias in participant.aliases() {
            if inner.alias_index.contains_key(&alias) {
                return Err(alias_in_use(&alias));
            }
        }
        participant.sequence = inner.next_sequence;
        index_participant(&mut inner, &participant);
    }

    if let Err(err) = persist_participant(state, &participant).await {
        let mut inner = lock_store(&state.store)?;
        inner.participants_by_id.remove(&participant.participant_id);
        for alias in participant.aliases() {
            inner.alias_index.remove(&alias);
        }
        return Err(err);
    }

    metrics_service::inc_participants_registered();

    Ok(RegisterParticipantResponse {
        accepted: true,
        participant: Some(ParticipantView::from_record(&participant, 0, 0)),
        error_code: None,
        reason: "participant registered".to_string(),
    })
}

pub async fn get_participant(
    state: &AppState,
    participant_key_or_alias: &str,
) -> Result<GetParticipantResponse, AppError> {
    let participant = get_participant_record(state, participant_key_or_alias.trim()).await?;
    let today = today_utc();
    Ok(GetParticipantResponse {
        found: true,
        participant: Some(ParticipantView::from_record(
            &participant,
            calculate_streak(&participant.daily_steps, today),
            goal_days(&participant.daily_steps),
        )),
        error_code: None,
        reason: "participant found".to_string(),
    })
}

pub async fn get_streak(
    state: &AppState,
    participant_key_or_alias: &str,
) -> Result<GetStreakResponse, AppError> {
    let participant = get_participant_record(state, participant_key_or_alias.trim()).await?;
    let today = today_utc();
    Ok(GetStreakResponse {
        found: true,
        participant_id: participant.participant_id.clone(),
        streak: calculate_streak(&participant.daily_steps, today),
        goal_days: goal_days(&participant.daily_steps),
        error_code: None,
        reason: "streak calculated".to_string(),
    })
}

pub async fn delete_participant(
    state: &AppState,
    participant_key_or_alias: &str,
) -> Result<DeleteParticipantResponse, AppError> {
    let _gate = state.store.write_gate.lock().await;
    let participant = get_participant_record(state, participant_key_or_alias.trim()).await?;
    let participant_id = participant.participant_id.clone();

    // Warm every entry the mirror knows about so the in-memory sweep below
    // sees the full set.
    let entry_ids = collect_entry_ids(state, &participant_id).await?;
    for entry_id in &entry_ids {
        let _ = crud::get_entry_record(state, entry_id).await;
    }

    let (previous_participant, removed_aliases, removed_entries, removed_blobs) = {
        let mut inner = lock_store(&state.store)?;
        let previous = inner
            .participants_by_id
            .remove(&participant_id)
            .ok_or_else(|| AppError::not_found("PARTICIPANT_NOT_FOUND", "participant not found"))?;

        let mut removed_aliases = Vec::new();
        for alias in previous.aliases() {
            if inner.alias_index.get(&alias) == Some(&participant_id) {
                inner.alias_index.remove(&alias);
                removed_aliases.push(alias);
            }
        }

        let entry_ids: Vec<String> = inner
            .entries_by_id
            .values()
            .filter(|e| e.participant_id == participant_id)
            .map(|e| e.entry_id.clone())
            .collect();
        let mut removed_entries: Vec<StepEntryRecord> = Vec::with_capacity(entry_ids.len());
        let mut removed_blobs = Vec::new();
        for entry_id in entry_ids {
            if let Some(entry) = inner.entries_by_id.remove(&entry_id) {
                if let Some(hash) = &entry.screenshot_hash {
                    if let Some(blob) = inner.screenshots_by_hash.remove(hash) {
                        removed_blobs.push((hash.clone(), blob));
                    }
                }
                removed_entries.push(entry);
            }
        }
        (previous, removed_aliases, removed_entries, removed_blobs)
    };

    if let Err(err) =
        persist_participant_delete(state, &previous_participant, &removed_aliases, &removed_entries)
            .await
    {
        let mut inner = lock_store(&state.store)?;
        index_participant(&mut inner, &previous_participant);
        for entry in removed_entries {
            inner.entries_by_id.insert(entry.entry_id.clone(), entry);
        }
        for (hash, blob) in removed_blobs {
            inner.screenshots_by_hash.insert(hash, blob);
        }
        return Err(err);
    }

    metrics_service::inc_participants_deleted();

    Ok(DeleteParticipantResponse {
        deleted: true,
        participant_id,
        entries_removed: removed_entries.len() as u64,
        error_code: None,
        reason: "participant and step entries deleted".to_string(),
    })
}

pub async fn leaderboard(state: &AppState) -> Result<LeaderboardResponse, AppError> {
    warm_all_participants(state).await?;
    let today = today_utc();

    let mut participants: Vec<ParticipantRecord> = {
        let inner = lock_store(&state.store)?;
        inner.participants_by_id.values().cloned().collect()
    };
    // Registration order is the tiebreak; ranking itself is a stable sort on
    // totals so equal totals keep that order. `sequence` carries that order
    // exactly; timestamps only disambiguate records warmed from another
    // process's mirror.
    participants.sort_by(|a, b| {
        a.sequence
            .cmp(&b.sequence)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.participant_id.cmp(&b.participant_id))
    });
    let totals: Vec<u64> = participants.iter().map(|p| p.total_steps).collect();

    let rows = crate::service::streak_service::rank_by_total(&totals)
        .into_iter()
        .map(|(rank, index)| {
            let participant = &participants[index];
            LeaderboardRow {
                rank,
                participant_id: participant.participant_id.clone(),
                name: participant.name.clone(),
                total_steps: participant.total_steps,
                streak: calculate_streak(&participant.daily_steps, today),
                goal_days: goal_days(&participant.daily_steps),
            }
        })
        .collect();

    Ok(LeaderboardResponse {
        rows,
        error_code: None,
        reason: "leaderboard calculated".to_string(),
    })
}

pub async fn admin_summary(state: &AppState) -> Result<AdminSummaryResponse, AppError> {
    warm_all_participants(state).await?;

    let inner = lock_store(&state.store)?;
    let mut pending = 0u64;
    let mut approved = 0u64;
    let mut rejected = 0u64;
    for entry in inner.entries_by_id.values() {
        match entry.status {
            EntryStatus::Pending => pending += 1,
            EntryStatus::Approved => approved += 1,
            EntryStatus::Rejected => rejected += 1,
        }
    }
    let total_steps = inner.participants_by_id.values().map(|p| p.total_steps).sum();

    Ok(AdminSummaryResponse {
        participants: inner.participants_by_id.len() as u64,
        entries_pending: pending,
        entries_approved: approved,
        entries_rejected: rejected,
        total_steps,
        error_code: None,
        reason: "summary calculated".to_string(),
    })
}

fn normalize_alias(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
}

fn alias_in_use(alias: &str) -> AppError {
    AppError::conflict(
        "ALIAS_IN_USE",
        format!("a participant is already registered with '{alias}'"),
    )
}

async fn collect_entry_ids(
    state: &AppState,
    participant_id: &str,
) -> Result<Vec<String>, AppError> {
    let mut ids: HashSet<String> = {
        let inner = lock_store(&state.store)?;
        inner
            .entries_by_id
            .values()
            .filter(|e| e.participant_id == participant_id)
            .map(|e| e.entry_id.clone())
            .collect()
    };
    if let Some(infra) = &state.infra {
        let mut conn = connect(infra).await?;
        let mirrored: Vec<String> = conn
            .smembers(participant_entries_key(participant_id))
            .await
            .map_err(|e| AppError::internal("REDIS_QUERY_FAILED", e.to_string()))?;
        ids.extend(mirrored);
    }
    Ok(ids.into_iter().collect())
}

async fn warm_all_participants(state: &AppState) -> Result<(), AppError> {
    let Some(infra) = &state.infra else {
        return Ok(());
    };
    let mut conn = connect(infra).await?;
    let ids: Vec<String> = conn
        .smembers(participants_all_key())
        .await
        .map_err(|e| AppError::internal("REDIS_QUERY_FAILED", e.to_string()))?;
    let missing: Vec<String> = {
        let inner = lock_store(&state.store)?;
        ids.into_iter()
            .filter(|id| !inner.participants_by_id.contains_key(id))
            .collect()
    };
    for id in missing {
        if let Some(participant) = crud::load_participant_from_redis(state, &id).await? {
            crud::warm_participant_in_memory(state, &participant)?;
        }
    }
    Ok(())
}

pub(crate) async fn persist_participant(
    state: &AppState,
    participant: &ParticipantRecord,
) -> Result<(), AppError> {
    let Some(infra) = &state.infra else {
        return Ok(());
    };
    let mut conn = connect(infra).await?;
    let mut pipe = redis::pipe();
    pipe.atomic();
    pipe.set(
        participant_key(&participant.participant_id),
        encode(participant)?,
    )
    .ignore();
    pipe.sadd(participants_all_key(), &participant.participant_id)
        .ignore();
    for alias in participant.aliases() {
        pipe.set(participant_alias_key(&alias), &participant.participant_id)
            .ignore();
    }
    let _: () = pipe
        .query_async(&mut conn)
        .await
        .map_err(|e| AppError::internal("REDIS_WRITE_FAILED", e.to_string()))?;
    Ok(())
}

async fn persist_participant_delete(
    state: &AppState,
    participant: &ParticipantRecord,
    aliases: &[String],
    entries: &[StepEntryRecord],
) -> Result<(), AppError> {
    let Some(infra) = &state.infra else {
        return Ok(());
    };
    let mut conn = connect(infra).await?;
    let mut pipe = redis::pipe();
    pipe.atomic();
    pipe.del(participant_key(&participant.participant_id)).ignore();
    pipe.srem(participants_all_key(), &participant.participant_id)
        .ignore();
    for alias in aliases {
        pipe.del(participant_alias_key(alias)).ignore();
    }
    for entry in entries {
        pipe.del(entry_key(&entry.entry_id)).ignore();
        if let Some(hash) = &entry.screenshot_hash {
            pipe.del(screenshot_key(hash)).ignore();
        }
    }
    pipe.del(participant_entries_key(&participant.participant_id))
        .ignore();
    let _: () = pipe
        .query_async(&mut conn)
        .await
        .map_err(|e| AppError::internal("REDIS_WRITE_FAILED", e.to_string()))?;
    Ok(())
}
