use super::model::{ActivityRecord, ParticipantRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterParticipantRequest {
    pub name: String,
    pub email: Option<String>,
    #[serde(alias = "employeeId")]
    pub employee_id: Option<String>,
    #[serde(alias = "authUid")]
    pub auth_uid: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityView {
    pub entry_id: String,
    pub steps: u64,
    pub message: String,
    pub occurred_at: i64,
}

impl ActivityView {
    pub fn from_record(activity: &ActivityRecord) -> Self {
        Self {
            entry_id: activity.entry_id.clone(),
            steps: activity.steps,
            message: activity.message.clone(),
            occurred_at: activity.occurred_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantView {
    pub participant_id: String,
    pub name: String,
    pub email: Option<String>,
    pub employee_id: Option<String>,
    pub auth_uid: Option<String>,
    pub total_steps: u64,
    pub daily_steps: BTreeMap<String, u64>,
    pub streak: u32,
    pub goal_days: u32,
    pub activities: Vec<ActivityView>,
    pub created_at: i64,
    pub updated_at: i64,
    pub last_activity_at: Option<i64>,
}

impl ParticipantView {
    pub fn from_record(participant: &ParticipantRecord, streak: u32, goal_days: u32) -> Self {
        Self {
            participant_id: participant.participant_id.clone(),
            name: participant.name.clone(),
            email: participant.email.clone(),
            employee_id: participant.employee_id.clone(),
            auth_uid: participant.auth_uid.clone(),
            total_steps: participant.total_steps,
            daily_steps: participant.daily_steps.clone(),
            streak,
            goal_days,
            activities: participant
                .activities
                .iter()
                .map(ActivityView::from_record)
                .collect(),
            created_at: participant.created_at,
            updated_at: participant.updated_at,
            last_activity_at: participant.last_activity_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterParticipantResponse {
    pub accepted: bool,
    pub participant: Option<ParticipantView>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetParticipantResponse {
    pub found: bool,
    pub participant: Option<ParticipantView>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteParticipantResponse {
    pub deleted: bool,
    pub participant_id: String,
    pub entries_removed: u64,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub rank: u32,
    pub participant_id: String,
    pub name: String,
    pub total_steps: u64,
    pub streak: u32,
    pub goal_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub rows: Vec<LeaderboardRow>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetStreakResponse {
    pub found: bool,
    pub participant_id: String,
    pub streak: u32,
    pub goal_days: u32,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSummaryResponse {
    pub participants: u64,
    pub entries_pending: u64,
    pub entries_approved: u64,
    pub entries_rejected: u64,
    pub total_steps: u64,
    pub error_code: Option<String>,
    pub reason: String,
}
