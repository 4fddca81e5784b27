use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub entry_id: String,
    pub steps: u64,
    pub message: String,
    pub occurred_at: i64,
}

/// Canonical participant record. Alias fields are normalized once at
/// registration; every other code path resolves participants through the
/// ledger's alias index and reads only this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub participant_id: String,
    pub name: String,
    pub email: Option<String>,
    pub employee_id: Option<String>,
    pub auth_uid: Option<String>,
    pub total_steps: u64,
    pub daily_steps: BTreeMap<String, u64>,
    pub activities: Vec<ActivityRecord>,
    /// Registration order within this ledger; timestamps alone cannot
    /// tiebreak same-second registrations.
    #[serde(default)]
    pub sequence: u64,
    pub created_at: i64,
    pub updated_at: i64,
    pub last_activity_at: Option<i64>,
}

impl ParticipantRecord {
    pub fn aliases(&self) -> Vec<String> {
        let mut aliases = Vec::new();
        for alias in [&self.email, &self.employee_id, &self.auth_uid] {
            if let Some(alias) = alias {
                let trimmed = alias.trim();
                if !trimmed.is_empty() {
                    aliases.push(trimmed.to_string());
                }
            }
        }
        aliases
    }
}
