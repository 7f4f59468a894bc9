//! Proactive risk advisory for a farm's location, crops and soil.

use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::backend::ModelRequest;
use crate::chat::FarmhandAgent;
use crate::error::TurnError;
use crate::models::{Advisory, AdvisoryRequest, Part};
use crate::normalize::resolve_language;
use crate::prompts;

pub fn validate_request(req: &AdvisoryRequest) -> Result<(), TurnError> {
  if req.location.trim().is_empty() {
    return Err(TurnError::InvalidRequest("Location is required.".to_string()));
  }
  if !req.crops.iter().any(|c| !c.trim().is_empty()) {
    return Err(TurnError::InvalidRequest("At least one crop is required.".to_string()));
  }
  if req.soil_type.trim().is_empty() {
    return Err(TurnError::InvalidRequest("Soil type is required.".to_string()));
  }
  Ok(())
}

pub fn advisory_schema() -> Value {
  json!({
    "type": "object",
    "properties": {
      "title": { "type": "string", "description": "e.g. 'Fungal Disease Alert for Wheat'." },
      "urgency": { "type": "string", "enum": ["High", "Medium", "Low"] },
      "riskProbability": { "type": "integer", "minimum": 0, "maximum": 100 },
      "pestOrDisease": { "type": "string" },
      "affectedCrop": { "type": "string", "description": "One of the farmer's crops." },
      "impactAnalysis": { "type": "string" },
      "preventiveAction": { "type": "string" },
      "imageHint": { "type": "string", "description": "Two keywords, e.g. 'wheat rust'." }
    },
    "required": [
      "title", "urgency", "riskProbability", "pestOrDisease",
      "affectedCrop", "impactAnalysis", "preventiveAction", "imageHint"
    ]
  })
}

impl FarmhandAgent {
  pub async fn proactive_advisory(&self, req: AdvisoryRequest) -> Result<Advisory, TurnError> {
    validate_request(&req)?;
    let crops: Vec<String> = req
      .crops
      .iter()
      .map(|c| c.trim().to_string())
      .filter(|c| !c.is_empty())
      .collect();
    let req = AdvisoryRequest { crops, ..req };
    let language = resolve_language(req.language.as_deref());
    info!(location = %req.location, crops = req.crops.len(), %language, "generating advisory");

    let request = ModelRequest {
      prompt: vec![Part::Text(prompts::advisory_prompt(&req, &language))],
      language,
      output_schema: Some(advisory_schema()),
      ..Default::default()
    };

    let raw = self.backend.generate(request).await.map_err(|err| {
      error!(error = %err, "advisory model call failed");
      TurnError::from(err)
    })?;
    let advisory: Advisory = match raw {
      Some(value @ Value::Object(_)) => serde_json::from_value(value).map_err(|err| {
        warn!(error = %err, "advisory output had the wrong shape");
        TurnError::MalformedResponse
      })?,
      _ => return Err(TurnError::MalformedResponse),
    };

    if advisory.risk_probability > 100 {
      warn!(risk = advisory.risk_probability, "risk probability out of range");
      return Err(TurnError::MalformedResponse);
    }
    Ok(advisory)
  }
}
