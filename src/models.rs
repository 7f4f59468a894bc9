use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  User,
  #[serde(alias = "assistant")]
  Model,
  Tool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaPart {
  pub url: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub content_type: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ToolRequestPart {
  pub name: String,
  #[serde(default)]
  pub input: serde_json::Value,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ToolResponsePart {
  pub name: String,
  #[serde(default)]
  pub output: serde_json::Value,
}

/// One piece of a conversation turn, keyed the way the web client sends it
/// (`{"text": ..}`, `{"media": {..}}`, `{"toolRequest": {..}}`, `{"toolResponse": {..}}`).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum Part {
  Text(String),
  Media(MediaPart),
  ToolRequest(ToolRequestPart),
  ToolResponse(ToolResponsePart),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum TurnContent {
  Text(String),
  Parts(Vec<Part>),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ConversationTurn {
  pub role: Role,
  pub content: TurnContent,
}

impl ConversationTurn {
  pub fn user(text: impl Into<String>) -> Self {
    Self {
      role: Role::User,
      content: TurnContent::Text(text.into()),
    }
  }

  pub fn model(text: impl Into<String>) -> Self {
    Self {
      role: Role::Model,
      content: TurnContent::Text(text.into()),
    }
  }

  pub fn parts(&self) -> Vec<Part> {
    match &self.content {
      TurnContent::Text(text) => vec![Part::Text(text.clone())],
      TurnContent::Parts(parts) => parts.clone(),
    }
  }
}

/// Raw chat input as received from the UI layer.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ChatRequest {
  #[serde(default)]
  pub message: String,
  #[serde(default)]
  pub history: Option<Vec<ConversationTurn>>,
  #[serde(default)]
  pub language: Option<String>,
}

/// A chat request after normalization; always carries a language.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatInput {
  pub message: String,
  pub history: Vec<ConversationTurn>,
  pub language: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
  Bar,
  Line,
  Pie,
  Area,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ChartPoint {
  pub name: String,
  pub value: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartPayload {
  pub title: String,
  pub description: String,
  pub chart_type: ChartType,
  pub data: Vec<ChartPoint>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ChatResponse {
  Text(String),
  Chart(ChartPayload),
}

impl ChatResponse {
  pub fn kind(&self) -> &'static str {
    match self {
      ChatResponse::Text(_) => "text",
      ChatResponse::Chart(_) => "chart",
    }
  }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FinalResponse {
  #[serde(flatten)]
  pub response: ChatResponse,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub audio: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisRequest {
  #[serde(default)]
  pub problem_description: String,
  #[serde(default)]
  pub photo_data_uri: Option<String>,
  #[serde(default)]
  pub language: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
  pub is_healthy: bool,
  pub issue: String,
  pub details: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Solution {
  pub recommendation: String,
  pub steps: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DiagnosisReport {
  pub diagnosis: Diagnosis,
  pub solution: Solution,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisResult {
  #[serde(flatten)]
  pub report: DiagnosisReport,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub audio_data_uri: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryRequest {
  #[serde(default)]
  pub location: String,
  #[serde(default)]
  pub language: Option<String>,
  #[serde(default)]
  pub crops: Vec<String>,
  #[serde(default)]
  pub soil_type: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Urgency {
  High,
  Medium,
  Low,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Advisory {
  pub title: String,
  pub urgency: Urgency,
  pub risk_probability: u8,
  pub pest_or_disease: String,
  pub affected_crop: String,
  pub impact_analysis: String,
  pub preventive_action: String,
  pub image_hint: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn text_response_serializes_with_type_tag() {
    let final_response = FinalResponse {
      response: ChatResponse::Text("Hello".to_string()),
      audio: None,
    };
    let value = serde_json::to_value(&final_response).unwrap();
    assert_eq!(value, serde_json::json!({ "type": "text", "data": "Hello" }));
  }

  #[test]
  fn chart_response_keeps_audio_alongside_payload() {
    let final_response = FinalResponse {
      response: ChatResponse::Chart(ChartPayload {
        title: "Rain".to_string(),
        description: "mm per day".to_string(),
        chart_type: ChartType::Bar,
        data: vec![ChartPoint {
          name: "Mon".to_string(),
          value: 4.0,
        }],
      }),
      audio: Some("data:audio/wav;base64,AAAA".to_string()),
    };
    let value = serde_json::to_value(&final_response).unwrap();
    assert_eq!(value["type"], "chart");
    assert_eq!(value["data"]["chartType"], "bar");
    assert_eq!(value["audio"], "data:audio/wav;base64,AAAA");
  }

  #[test]
  fn history_accepts_plain_and_structured_content() {
    let raw = serde_json::json!([
      { "role": "user", "content": "Weather in Pune?" },
      { "role": "model", "content": [{ "toolRequest": { "name": "getWeather", "input": { "city": "Pune" } } }] },
      { "role": "tool", "content": [{ "toolResponse": { "name": "getWeather", "output": [] } }] },
      { "role": "assistant", "content": [{ "text": "Sunny." }] }
    ]);
    let turns: Vec<ConversationTurn> = serde_json::from_value(raw).unwrap();
    assert_eq!(turns.len(), 4);
    assert_eq!(turns[0], ConversationTurn::user("Weather in Pune?"));
    assert!(matches!(turns[1].parts()[0], Part::ToolRequest(_)));
    assert_eq!(turns[2].role, Role::Tool);
    assert_eq!(turns[3].role, Role::Model);
  }
}
