//! Conversational turn handling.
//!
//! A turn moves through normalize -> model call -> validate -> audio. A model
//! failure that signals upstream overload is answered with a fixed apology;
//! every other failure is returned to the caller.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{error, info, warn, Instrument};

use crate::backend::{ModelBackend, ModelRequest};
use crate::error::{is_transient, TurnError};
use crate::models::{ChatRequest, ChatResponse, FinalResponse, Part};
use crate::normalize::normalize;
use crate::prompts;
use crate::speech::{self, SpeechSynthesizer};
use crate::tools::{ToolRegistry, CHAT_TOOLS};
use crate::validate::validate_response;

pub const BUSY_APOLOGY: &str =
  "I'm sorry, the AI service is currently very busy. Please try again in a moment.";

/// Holds the injected collaborators; cheap to clone and safe to share
/// between concurrent turns.
#[derive(Clone)]
pub struct FarmhandAgent {
  pub(crate) backend: Arc<dyn ModelBackend>,
  pub(crate) speech: Option<Arc<dyn SpeechSynthesizer>>,
  pub(crate) tools: Arc<ToolRegistry>,
}

impl FarmhandAgent {
  pub fn new(
    backend: Arc<dyn ModelBackend>,
    speech: Option<Arc<dyn SpeechSynthesizer>>,
    tools: Arc<ToolRegistry>,
  ) -> Self {
    Self {
      backend,
      speech,
      tools,
    }
  }

  pub fn tools(&self) -> &ToolRegistry {
    &self.tools
  }

  pub(crate) fn synthesizer(&self) -> Option<&dyn SpeechSynthesizer> {
    self.speech.as_deref()
  }

  /// Runs one chat turn.
  pub async fn chat(&self, req: ChatRequest) -> Result<FinalResponse, TurnError> {
    let turn_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("chat_turn", %turn_id);
    self.run_turn(req).instrument(span).await
  }

  async fn run_turn(&self, req: ChatRequest) -> Result<FinalResponse, TurnError> {
    let input = normalize(req)?;
    info!(
      language = %input.language,
      history_len = input.history.len(),
      "handling chat turn"
    );

    let request = ModelRequest {
      system_prompt: Some(prompts::chat_system_prompt(&input.language)),
      history: input.history,
      prompt: vec![Part::Text(input.message)],
      language: input.language.clone(),
      tools: self.tools.definitions_for(&CHAT_TOOLS),
      output_schema: Some(chat_output_schema()),
    };

    let raw = match self.backend.generate(request).await {
      Ok(raw) => raw,
      Err(err) if is_transient(&err.message) => {
        warn!(error = %err, "model service busy, sending apology");
        return Ok(FinalResponse {
          response: ChatResponse::Text(BUSY_APOLOGY.to_string()),
          audio: None,
        });
      }
      Err(err) => {
        error!(error = %err, "model call failed");
        return Err(err.into());
      }
    };

    let response = validate_response(raw)?;
    let audio = speech::augment(self.synthesizer(), &response, &input.language).await;
    info!(
      kind = response.kind(),
      has_audio = audio.is_some(),
      "chat turn complete"
    );
    Ok(FinalResponse { response, audio })
  }
}

/// JSON schema of the two reply shapes the model may produce.
pub fn chat_output_schema() -> Value {
  json!({
    "anyOf": [
      {
        "type": "object",
        "properties": {
          "type": { "type": "string", "enum": ["text"] },
          "data": { "type": "string", "description": "The plain text reply." }
        },
        "required": ["type", "data"]
      },
      {
        "type": "object",
        "properties": {
          "type": { "type": "string", "enum": ["chart"] },
          "data": {
            "type": "object",
            "properties": {
              "title": { "type": "string", "description": "Chart title, e.g. '7-Day Temperature Forecast'." },
              "description": { "type": "string", "description": "What the data shows, including units." },
              "chartType": { "type": "string", "enum": ["bar", "line", "pie", "area"] },
              "data": {
                "type": "array",
                "items": {
                  "type": "object",
                  "properties": {
                    "name": { "type": "string", "description": "Label such as a date or a category." },
                    "value": { "type": "number" }
                  },
                  "required": ["name", "value"]
                }
              }
            },
            "required": ["title", "description", "chartType", "data"]
          }
        },
        "required": ["type", "data"]
      }
    ]
  })
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use crate::error::ModelError;
  use crate::models::{ChartType, ConversationTurn};
  use crate::schema;
  use crate::speech::tests::FakeSpeech;
  use async_trait::async_trait;
  use std::sync::Mutex;

  /// Replays one canned result and records the requests it saw.
  pub(crate) struct ScriptedModel {
    pub result: Result<Option<Value>, ModelError>,
    pub seen: Mutex<Vec<ModelRequest>>,
  }

  impl ScriptedModel {
    pub(crate) fn returning(value: Value) -> Self {
      Self {
        result: Ok(Some(value)),
        seen: Mutex::new(Vec::new()),
      }
    }

    pub(crate) fn failing(message: &str) -> Self {
      Self {
        result: Err(ModelError::new(message)),
        seen: Mutex::new(Vec::new()),
      }
    }

    pub(crate) fn silent() -> Self {
      Self {
        result: Ok(None),
        seen: Mutex::new(Vec::new()),
      }
    }

    pub(crate) fn last_request(&self) -> ModelRequest {
      self.seen.lock().unwrap().last().cloned().expect("model was called")
    }
  }

  #[async_trait]
  impl ModelBackend for ScriptedModel {
    async fn generate(&self, request: ModelRequest) -> Result<Option<Value>, ModelError> {
      self.seen.lock().unwrap().push(request);
      self.result.clone()
    }
  }

  fn agent(model: Arc<ScriptedModel>, speech: Option<Arc<FakeSpeech>>) -> FarmhandAgent {
    FarmhandAgent::new(
      model,
      speech.map(|s| s as Arc<dyn SpeechSynthesizer>),
      Arc::new(ToolRegistry::farm_defaults()),
    )
  }

  fn ask(message: &str) -> ChatRequest {
    ChatRequest {
      message: message.to_string(),
      ..Default::default()
    }
  }

  #[tokio::test]
  async fn bare_string_reply_becomes_text_with_audio() {
    let model = Arc::new(ScriptedModel::returning(json!("Hello! How can I help?")));
    let speech = Arc::new(FakeSpeech::ok());
    let out = agent(model.clone(), Some(speech.clone())).chat(ask("Hi")).await.unwrap();

    assert_eq!(out.response, ChatResponse::Text("Hello! How can I help?".to_string()));
    assert!(out.audio.is_some());
    assert_eq!(speech.calls(), vec![("Hello! How can I help?".to_string(), "en".to_string())]);

    let seen = model.last_request();
    assert_eq!(seen.language, "en");
    assert_eq!(seen.prompt, vec![Part::Text("Hi".to_string())]);
    let tool_names: Vec<String> = seen.tools.into_iter().map(|t| t.name).collect();
    assert_eq!(tool_names, vec!["getWeather", "getSuggestions", "getSeedInfo"]);
  }

  #[tokio::test]
  async fn chart_reply_is_spoken_as_title_and_description() {
    let model = Arc::new(ScriptedModel::returning(json!({
      "type": "chart",
      "data": {
        "title": "Pune 3-Day Forecast",
        "description": "Temperature in °C",
        "chartType": "bar",
        "data": [{ "name": "2024-09-23", "value": 29 }]
      }
    })));
    let speech = Arc::new(FakeSpeech::ok());
    let req = ChatRequest {
      message: "Show me the weather chart".to_string(),
      history: Some(vec![ConversationTurn::user("Hi"), ConversationTurn::model("Hello")]),
      language: Some("hi".to_string()),
    };
    let out = agent(model.clone(), Some(speech.clone())).chat(req).await.unwrap();

    match &out.response {
      ChatResponse::Chart(chart) => assert_eq!(chart.chart_type, ChartType::Bar),
      other => panic!("expected chart, got {other:?}"),
    }
    assert_eq!(
      speech.calls(),
      vec![("Pune 3-Day Forecast. Temperature in °C".to_string(), "hi".to_string())]
    );
    assert_eq!(model.last_request().history.len(), 2);
  }

  #[tokio::test]
  async fn busy_upstream_gets_apology_without_audio() {
    let model = Arc::new(ScriptedModel::failing(
      "Gemini API error (503 Service Unavailable): The model is overloaded.",
    ));
    let speech = Arc::new(FakeSpeech::ok());
    let out = agent(model, Some(speech.clone())).chat(ask("Weather?")).await.unwrap();

    assert_eq!(out.response, ChatResponse::Text(BUSY_APOLOGY.to_string()));
    assert_eq!(out.audio, None);
    assert!(speech.calls().is_empty());
    assert_eq!(
      serde_json::to_value(&out).unwrap(),
      json!({ "type": "text", "data": BUSY_APOLOGY })
    );
  }

  #[tokio::test]
  async fn other_failures_propagate_original_message() {
    let model = Arc::new(ScriptedModel::failing("Gemini API error (400 Bad Request): bad key"));
    let err = agent(model, None).chat(ask("Hi")).await.unwrap_err();
    assert_eq!(err, TurnError::Upstream("Gemini API error (400 Bad Request): bad key".to_string()));
  }

  #[tokio::test]
  async fn speech_failure_keeps_the_answer() {
    let model = Arc::new(ScriptedModel::returning(json!({ "type": "text", "data": "Use neem oil." })));
    let speech = Arc::new(FakeSpeech::failing());
    let out = agent(model, Some(speech)).chat(ask("Aphids?")).await.unwrap();
    assert_eq!(out.response, ChatResponse::Text("Use neem oil.".to_string()));
    assert_eq!(out.audio, None);
  }

  #[tokio::test]
  async fn missing_output_is_malformed() {
    let model = Arc::new(ScriptedModel::silent());
    let err = agent(model, None).chat(ask("Hi")).await.unwrap_err();
    assert_eq!(err, TurnError::MalformedResponse);
  }

  #[tokio::test]
  async fn mixed_payload_is_malformed() {
    let model = Arc::new(ScriptedModel::returning(json!({ "type": "text", "data": { "title": "x" } })));
    let err = agent(model, None).chat(ask("Hi")).await.unwrap_err();
    assert_eq!(err, TurnError::MalformedResponse);
  }

  #[tokio::test]
  async fn empty_message_never_reaches_the_model() {
    let model = Arc::new(ScriptedModel::returning(json!("unused")));
    let err = agent(model.clone(), None).chat(ask("  ")).await.unwrap_err();
    assert!(matches!(err, TurnError::InvalidRequest(_)));
    assert!(model.seen.lock().unwrap().is_empty());
  }

  #[test]
  fn output_schema_accepts_exactly_the_two_shapes() {
    let schema = chat_output_schema();
    assert!(schema::validate(&json!({ "type": "text", "data": "hi" }), &schema).is_ok());
    assert!(schema::validate(
      &json!({ "type": "chart", "data": { "title": "t", "description": "d", "chartType": "pie", "data": [] } }),
      &schema
    )
    .is_ok());
    assert!(schema::validate(&json!({ "type": "chart", "data": "hi" }), &schema).is_err());
  }
}
