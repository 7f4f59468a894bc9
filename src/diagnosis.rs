//! Crop problem diagnosis from a description and an optional photo.

use serde_json::{json, Value};
use tracing::{error, info, warn, Instrument};

use crate::backend::ModelRequest;
use crate::chat::FarmhandAgent;
use crate::data_uri;
use crate::error::TurnError;
use crate::models::{DiagnosisReport, DiagnosisRequest, DiagnosisResult, MediaPart, Part};
use crate::normalize::resolve_language;
use crate::prompts;
use crate::speech;

pub const MIN_DESCRIPTION_CHARS: usize = 10;
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

pub fn validate_request(req: &DiagnosisRequest) -> Result<(), TurnError> {
  let chars = req.problem_description.trim().chars().count();
  if chars < MIN_DESCRIPTION_CHARS {
    return Err(TurnError::InvalidRequest(format!(
      "Problem description must be at least {MIN_DESCRIPTION_CHARS} characters."
    )));
  }
  if chars > MAX_DESCRIPTION_CHARS {
    return Err(TurnError::InvalidRequest(format!(
      "Problem description must be at most {MAX_DESCRIPTION_CHARS} characters."
    )));
  }
  if let Some(photo) = req.photo_data_uri.as_deref() {
    if data_uri::parse(photo).is_none() {
      return Err(TurnError::InvalidRequest(
        "Photo must be a base64 data URI (data:<mimetype>;base64,<data>).".to_string(),
      ));
    }
  }
  Ok(())
}

pub fn speakable_text(report: &DiagnosisReport) -> String {
  format!(
    "Diagnosis: {}. Details: {}. Recommendation: {}. Here are the steps: {}",
    report.diagnosis.issue,
    report.diagnosis.details,
    report.solution.recommendation,
    report.solution.steps.join(". ")
  )
}

pub fn diagnosis_schema() -> Value {
  json!({
    "type": "object",
    "properties": {
      "diagnosis": {
        "type": "object",
        "properties": {
          "isHealthy": { "type": "boolean", "description": "Whether the plant or soil is healthy." },
          "issue": { "type": "string", "description": "The issue identified, e.g. 'Blight' or 'Nitrogen Deficiency'." },
          "details": { "type": "string", "description": "A detailed explanation of the diagnosis." }
        },
        "required": ["isHealthy", "issue", "details"]
      },
      "solution": {
        "type": "object",
        "properties": {
          "recommendation": { "type": "string", "description": "A concise, actionable recommendation." },
          "steps": { "type": "array", "items": { "type": "string" }, "description": "Step-by-step instructions." }
        },
        "required": ["recommendation", "steps"]
      }
    },
    "required": ["diagnosis", "solution"]
  })
}

impl FarmhandAgent {
  pub async fn diagnose(&self, req: DiagnosisRequest) -> Result<DiagnosisResult, TurnError> {
    let span = tracing::info_span!("diagnosis", request_id = %uuid::Uuid::new_v4());
    self.run_diagnosis(req).instrument(span).await
  }

  async fn run_diagnosis(&self, req: DiagnosisRequest) -> Result<DiagnosisResult, TurnError> {
    validate_request(&req)?;
    let language = resolve_language(req.language.as_deref());
    let has_photo = req.photo_data_uri.is_some();
    info!(%language, has_photo, "diagnosing farm problem");

    let mut prompt = vec![Part::Text(prompts::diagnosis_prompt(
      req.problem_description.trim(),
      &language,
      has_photo,
    ))];
    if let Some(url) = req.photo_data_uri {
      let content_type = data_uri::parse(&url).map(|uri| uri.mime.to_string());
      prompt.push(Part::Media(MediaPart { url, content_type }));
    }

    let request = ModelRequest {
      prompt,
      language: language.clone(),
      output_schema: Some(diagnosis_schema()),
      ..Default::default()
    };

    let raw = self.backend.generate(request).await.map_err(|err| {
      error!(error = %err, "diagnosis model call failed");
      TurnError::from(err)
    })?;
    let report: DiagnosisReport = match raw {
      Some(value @ Value::Object(_)) => serde_json::from_value(value).map_err(|err| {
        warn!(error = %err, "diagnosis output had the wrong shape");
        TurnError::MalformedResponse
      })?,
      _ => {
        warn!("model returned no diagnosis");
        return Err(TurnError::MalformedResponse);
      }
    };

    let audio_data_uri =
      speech::synthesize_or_skip(self.synthesizer(), &speakable_text(&report), &language).await;
    Ok(DiagnosisResult {
      report,
      audio_data_uri,
    })
  }
}
