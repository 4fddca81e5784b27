use crate::module::step_entry::error::AppError;
use crate::service::extraction_service::{extract_step_count, RecognizedWord};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizedText {
    pub text: String,
    #[serde(default)]
    pub words: Vec<RecognizedWord>,
}

/// Narrow seam to whatever OCR engine the deployment wires in. Test builds
/// substitute a canned engine; production uses the HTTP adapter below.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image_base64: &str) -> Result<RecognizedText, String>;
}

pub struct HttpOcrEngine {
    client: reqwest::Client,
    base_url: String,
}

impl HttpOcrEngine {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl OcrEngine for HttpOcrEngine {
    async fn recognize(&self, image_base64: &str) -> Result<RecognizedText, String> {
        let response = self
            .client
            .post(format!(
                "{}/v1/ocr/recognize",
                self.base_url.trim_end_matches('/')
            ))
            .header("content-type", "application/json")
            .json(&serde_json::json!({ "image_base64": image_base64 }))
            .send()
            .await
            .map_err(|e| format!("ocr request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("ocr engine returned status {}", status.as_u16()));
        }
        response
            .json::<RecognizedText>()
            .await
            .map_err(|e| format!("ocr response decode failed: {e}"))
    }
}

/// Runs the extraction heuristic over one or more recognition passes of the
/// same screenshot (original / preprocessed / numbers-only crop), returning
/// the first non-zero estimate. Each pass runs under its own timeout so a
/// stuck engine cannot hold the request open. Ok(0) means every pass
/// recognized text but nothing plausible was found.
pub async fn extract_from_image_passes(
    engine: &dyn OcrEngine,
    images_base64: &[String],
    timeout_seconds: i64,
) -> Result<u64, AppError> {
    let timeout = Duration::from_secs(timeout_seconds.max(1) as u64);
    let mut recognized_any = false;
    let mut last_error = String::from("no recognition passes ran");

    for image in images_base64 {
        let recognized = match tokio::time::timeout(timeout, engine.recognize(image)).await {
            Err(_) => {
                warn!(timeout_seconds, "ocr pass timed out");
                last_error = format!("ocr pass timed out after {timeout_seconds}s");
                continue;
            }
            Ok(Err(e)) => {
                warn!(error = %e, "ocr pass failed");
                last_error = e;
                continue;
            }
            Ok(Ok(recognized)) => recognized,
        };

        recognized_any = true;
        let steps = extract_step_count(&recognized.text, &recognized.words);
        if steps > 0 {
            return Ok(steps);
        }
    }

    if recognized_any {
        Ok(0)
    } else {
        Err(AppError::internal("OCR_RECOGNIZE_FAILED", last_error))
    }
}
