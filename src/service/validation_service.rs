use crate::module::participant::schema::RegisterParticipantRequest;
use crate::module::step_entry::error::AppError;
use crate::module::step_entry::model::{EntrySource, EntryStatus};
use crate::module::step_entry::schema::{
    EditStepEntryRequest, SubmitStepEntryRequest, ValidateStepEntryRequest,
};

pub fn validate_register_request(req: &RegisterParticipantRequest) -> Result<(), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::bad_request("INVALID_NAME", "name is required"));
    }
    if let Some(email) = &req.email {
        if !email.trim().is_empty() && !email.contains('@') {
            return Err(AppError::bad_request(
                "INVALID_EMAIL",
                "email must contain '@'",
            ));
        }
    }
    if let Some(employee_id) = &req.employee_id {
        if !employee_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(AppError::bad_request(
                "INVALID_EMPLOYEE_ID",
                "employee_id contains invalid characters",
            ));
        }
    }
    Ok(())
}

pub fn validate_submit_request(req: &SubmitStepEntryRequest) -> Result<(), AppError> {
    if req.participant_id.trim().is_empty() {
        return Err(AppError::bad_request(
            "INVALID_PARTICIPANT_ID",
            "participant_id is required",
        ));
    }
    if req.steps <= 0 {
        return Err(AppError::bad_request(
            "INVALID_STEPS",
            "steps must be a positive number",
        ));
    }
    let has_screenshot = req
        .screenshot_base64
        .as_deref()
        .map(str::trim)
        .is_some_and(|s| !s.is_empty());
    if !has_screenshot && req.source != EntrySource::StepCounter {
        return Err(AppError::bad_request(
            "SCREENSHOT_REQUIRED",
            "a screenshot is required unless steps come from the step counter",
        ));
    }
    Ok(())
}

pub fn validate_judgement_request(req: &ValidateStepEntryRequest) -> Result<(), AppError> {
    if req.validated_by.trim().is_empty() {
        return Err(AppError::bad_request(
            "INVALID_VALIDATOR",
            "validated_by is required",
        ));
    }
    if req.next_status == EntryStatus::Pending {
        return Err(AppError::bad_request(
            "INVALID_TARGET_STATUS",
            "entries can only be validated to approved or rejected",
        ));
    }
    if req.next_status == EntryStatus::Rejected {
        let has_notes = req
            .notes
            .as_deref()
            .map(str::trim)
            .is_some_and(|s| !s.is_empty());
        if !has_notes {
            return Err(AppError::bad_request(
                "REJECTION_REQUIRES_NOTES",
                "a reason is required when rejecting an entry",
            ));
        }
    }
    Ok(())
}

pub fn validate_edit_request(req: &EditStepEntryRequest) -> Result<(), AppError> {
    if req.modified_by.trim().is_empty() {
        return Err(AppError::bad_request(
            "INVALID_MODIFIER",
            "modified_by is required",
        ));
    }
    if req.new_steps < 0 {
        return Err(AppError::bad_request(
            "INVALID_STEPS",
            "steps must be zero or greater",
        ));
    }
    Ok(())
}
