use super::model::{EntrySource, EntryStatus, StepEntryRecord};
use crate::service::extraction_service::RecognizedWord;
use crate::service::motion_service::AccelSample;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitStepEntryRequest {
    #[serde(alias = "participantId")]
    pub participant_id: String,
    pub steps: i64,
    #[serde(alias = "screenshotBase64")]
    pub screenshot_base64: Option<String>,
    pub source: EntrySource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitStepEntryResponse {
    pub accepted: bool,
    pub entry_id: String,
    pub participant_id: String,
    pub steps: u64,
    pub status: Option<EntryStatus>,
    pub day: String,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepEntryView {
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

impl StepEntryView {
    pub fn from_record(entry: &StepEntryRecord) -> Self {
        Self {
            entry_id: entry.entry_id.clone(),
            participant_id: entry.participant_id.clone(),
            steps: entry.steps,
            screenshot_hash: entry.screenshot_hash.clone(),
            source: entry.source,
            submitted_at: entry.submitted_at,
            day: entry.day.clone(),
            status: entry.status,
            validated_by: entry.validated_by.clone(),
            validated_at: entry.validated_at,
            notes: entry.notes.clone(),
            last_modified_by: entry.last_modified_by.clone(),
            last_modified_at: entry.last_modified_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetStepEntryResponse {
    pub found: bool,
    pub entry: Option<StepEntryView>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetStepEntriesByParticipantResponse {
    pub found: bool,
    pub participant_id: String,
    pub entries: Vec<StepEntryView>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateStepEntryRequest {
    #[serde(alias = "nextStatus")]
    pub next_status: EntryStatus,
    pub notes: Option<String>,
    #[serde(alias = "validatedBy")]
    pub validated_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateStepEntryResponse {
    pub updated: bool,
    pub idempotent: bool,
    pub entry: Option<StepEntryView>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditStepEntryRequest {
    #[serde(alias = "newSteps")]
    pub new_steps: i64,
    #[serde(alias = "modifiedBy")]
    pub modified_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditStepEntryResponse {
    pub updated: bool,
    pub previous_steps: u64,
    pub entry: Option<StepEntryView>,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteStepEntryResponse {
    pub deleted: bool,
    pub entry_id: String,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractStepsRequest {
    pub text: String,
    #[serde(default)]
    pub words: Vec<RecognizedWord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractStepsResponse {
    pub found: bool,
    pub steps: u64,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractStepsFromImageRequest {
    /// Up to three passes of the same screenshot: original, preprocessed,
    /// numbers-only crop. Recognized in order, first plausible count wins.
    pub images_base64: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractStepsFromImageResponse {
    pub available: bool,
    pub found: bool,
    pub steps: u64,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountMotionStepsRequest {
    pub samples: Vec<AccelSample>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountMotionStepsResponse {
    pub steps: u64,
    pub samples_processed: u64,
    pub error_code: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthMetricsView {
    pub entries_submitted: u64,
    pub entries_approved: u64,
    pub entries_rejected: u64,
    pub entries_edited: u64,
    pub entries_deleted: u64,
    pub participants_registered: u64,
    pub participants_deleted: u64,
    pub extractions_run: u64,
    pub extractions_empty: u64,
    pub last_error_ts: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub redis_available: bool,
    pub ocr_available: bool,
    pub metrics: HealthMetricsView,
    pub error_code: Option<String>,
    pub reason: String,
}
