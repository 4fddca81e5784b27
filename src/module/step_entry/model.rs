use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Pending,
    Approved,
    Rejected,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Whether the entry's steps are currently reflected in the owner's
    /// aggregates. Pending entries count provisionally from submission time;
    /// only a rejection takes them back out.
    pub fn is_counted(&self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum EntrySource {
    Manual,
    Screenshot,
    StepCounter,
}

impl EntrySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Screenshot => "screenshot",
            Self::StepCounter => "step-counter",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepEntryRecord {
    pub entry_id: String,
    pub participant_id: String,
    pub steps: u64,
    pub screenshot_hash: Option<String>,
    pub source: EntrySource,
    pub submitted_at: i64,
    pub day: String,
    pub status: EntryStatus,
    pub validated_by: Option<String>,
    pub validated_at: Option<i64>,
    pub notes: Option<String>,
    pub last_modified_by: Option<String>,
    pub last_modified_at: Option<i64>,
}
