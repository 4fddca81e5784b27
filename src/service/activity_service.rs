use crate::module::participant::model::{ActivityRecord, ParticipantRecord};
use crate::module::step_entry::model::{EntrySource, EntryStatus};
use chrono::Utc;

pub const ACTIVITY_LOG_LIMIT: usize = 20;

/// Prepends a user-visible activity line, keeping only the newest 20.
pub fn push_activity(participant: &mut ParticipantRecord, entry_id: &str, steps: u64, message: String) {
    participant.activities.insert(
        0,
        ActivityRecord {
            entry_id: entry_id.to_string(),
            steps,
            message,
            occurred_at: Utc::now().timestamp(),
        },
    );
    participant.activities.truncate(ACTIVITY_LOG_LIMIT);
}

/// Rewrites the activity line belonging to an entry after a judgement or edit.
pub fn rewrite_activity(participant: &mut ParticipantRecord, entry_id: &str, message: String) {
    if let Some(activity) = participant
        .activities
        .iter_mut()
        .find(|a| a.entry_id == entry_id)
    {
        activity.message = message;
    }
}

pub fn remove_activity(participant: &mut ParticipantRecord, entry_id: &str) {
    participant.activities.retain(|a| a.entry_id != entry_id);
}

pub fn submission_message(steps: u64, source: EntrySource) -> String {
    match source {
        EntrySource::StepCounter => format!(
            "Counted {} steps using step counter (Pending validation)",
            format_steps(steps)
        ),
        _ => format!("Added {} steps (Pending validation)", format_steps(steps)),
    }
}

pub fn validation_message(steps: u64, previous: EntryStatus, next: EntryStatus) -> String {
    match (previous, next) {
        (EntryStatus::Approved, EntryStatus::Approved) => {
            format!("Steps re-approved: {} steps (Approved)", format_steps(steps))
        }
        (EntryStatus::Rejected, EntryStatus::Approved) => format!(
            "Steps approved after rejection: {} steps (Approved)",
            format_steps(steps)
        ),
        (_, EntryStatus::Approved) => format!("Added {} steps (Approved)", format_steps(steps)),
        (_, EntryStatus::Rejected) => format!("Added {} steps (Rejected)", format_steps(steps)),
        (_, EntryStatus::Pending) => {
            format!("Added {} steps (Pending validation)", format_steps(steps))
        }
    }
}

pub fn edit_message(previous_steps: u64, new_steps: u64) -> String {
    format!(
        "Steps updated: {} -> {} (Pending re-approval)",
        format_steps(previous_steps),
        format_steps(new_steps)
    )
}

/// Thousands-grouped rendering, e.g. 6162 -> "6,162".
pub fn format_steps(steps: u64) -> String {
    let digits = steps.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
