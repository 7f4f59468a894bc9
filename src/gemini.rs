//! Google Gemini backend.
//!
//! `GeminiClient` is the explicitly constructed handle to the Generative
//! Language API (key and base URL in, client out). `GeminiBackend` runs the
//! tool-calling loop on top of it and `GeminiSpeech` turns text into a WAV
//! data URI with a TTS model.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::backend::{ModelBackend, ModelRequest};
use crate::data_uri;
use crate::error::{ModelError, SpeechError};
use crate::models::{ConversationTurn, Part, Role};
use crate::prompts;
use crate::speech::SpeechSynthesizer;
use crate::tools::ToolRegistry;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone)]
pub struct GeminiClient {
  api_key: String,
  api_base: String,
  http: reqwest::Client,
}

impl GeminiClient {
  pub fn new(api_key: &str, api_base: &str) -> Result<Self, ModelError> {
    if api_key.trim().is_empty() {
      return Err(ModelError::new("Gemini API key is empty."));
    }
    Ok(Self {
      api_key: api_key.trim().to_string(),
      api_base: api_base.trim_end_matches('/').to_string(),
      http: reqwest::Client::new(),
    })
  }

  pub async fn generate_content(&self, model: &str, body: &Value) -> Result<Value, ModelError> {
    let url = format!("{}/models/{}:generateContent", self.api_base, model);
    debug!(%model, "calling Gemini API");

    let resp = self
      .http
      .post(&url)
      .header("x-goog-api-key", &self.api_key)
      .json(body)
      .send()
      .await?;

    if !resp.status().is_success() {
      let upstream_status = resp.status();
      let text = resp
        .text()
        .await
        .unwrap_or_else(|_| "Gemini request failed.".to_string());
      return Err(ModelError::new(format!("Gemini API error ({}): {}", upstream_status, text)));
    }

    Ok(resp.json::<Value>().await?)
  }
}

#[derive(Clone, Debug)]
pub struct GeminiSettings {
  pub model: String,
  pub max_tool_rounds: usize,
}

pub struct GeminiBackend {
  client: GeminiClient,
  settings: GeminiSettings,
  tools: Arc<ToolRegistry>,
}

impl GeminiBackend {
  pub fn new(client: GeminiClient, settings: GeminiSettings, tools: Arc<ToolRegistry>) -> Self {
    Self {
      client,
      settings,
      tools,
    }
  }

  fn run_tool(&self, request: &ModelRequest, name: &str, args: Value) -> Value {
    if !request.tools.iter().any(|t| t.name == name) {
      return json!({ "error": format!("unknown tool '{name}'") });
    }
    match self.tools.invoke(name, args) {
      Ok(output) => output,
      Err(err) => json!({ "error": err.to_string() }),
    }
  }
}

#[async_trait]
impl ModelBackend for GeminiBackend {
  async fn generate(&self, request: ModelRequest) -> Result<Option<Value>, ModelError> {
    let mut contents = to_gemini_contents(&request.history);
    contents.push(json!({ "role": "user", "parts": to_gemini_parts(&request.prompt) }));

    for round in 0..=self.settings.max_tool_rounds {
      let body = build_request_body(&request, &contents);
      let reply = self.client.generate_content(&self.settings.model, &body).await?;
      let parts = candidate_parts(&reply);
      let calls = function_calls(&parts);

      if calls.is_empty() {
        return Ok(parse_output(&collect_text(&parts)));
      }

      info!(round, tool_calls = calls.len(), "model requested tools");
      contents.push(json!({ "role": "model", "parts": parts }));
      let responses: Vec<Value> = calls
        .into_iter()
        .map(|(name, args)| {
          let output = self.run_tool(&request, &name, args);
          json!({ "functionResponse": { "name": name, "response": { "output": output } } })
        })
        .collect();
      contents.push(json!({ "role": "user", "parts": responses }));
    }

    Err(ModelError::new(format!(
      "The model did not finish within {} tool rounds.",
      self.settings.max_tool_rounds
    )))
  }
}

/// Converts caller-owned history into Gemini `contents`.
///
/// Tool responses (from any turn) go out as `functionResponse` parts in a
/// separate user turn; plain text inside a tool turn is sent as user text.
pub fn to_gemini_contents(history: &[ConversationTurn]) -> Vec<Value> {
  let mut contents = Vec::new();
  for turn in history {
    let mut main = Vec::new();
    let mut function = Vec::new();
    for part in turn.parts() {
      match (&part, turn.role) {
        (Part::ToolResponse(resp), _) => function.push(json!({
          "functionResponse": { "name": resp.name, "response": { "output": resp.output } }
        })),
        (Part::Text(text), Role::Tool) => main.push(json!({ "text": format!("Tool output: {text}") })),
        _ => main.extend(to_gemini_part(&part)),
      }
    }

    let role = match turn.role {
      Role::User | Role::Tool => "user",
      Role::Model => "model",
    };
    if !main.is_empty() {
      contents.push(json!({ "role": role, "parts": main }));
    }
    if !function.is_empty() {
      contents.push(json!({ "role": "user", "parts": function }));
    }
  }
  contents
}

pub fn to_gemini_parts(parts: &[Part]) -> Vec<Value> {
  parts.iter().filter_map(to_gemini_part).collect()
}

fn to_gemini_part(part: &Part) -> Option<Value> {
  match part {
    Part::Text(text) => Some(json!({ "text": text })),
    Part::Media(media) => {
      let uri = data_uri::parse(&media.url)?;
      Some(json!({ "inlineData": { "mimeType": uri.mime, "data": uri.data } }))
    }
    Part::ToolRequest(req) => Some(json!({ "functionCall": { "name": req.name, "args": req.input } })),
    Part::ToolResponse(resp) => Some(json!({
      "functionResponse": { "name": resp.name, "response": { "output": resp.output } }
    })),
  }
}

pub fn build_request_body(request: &ModelRequest, contents: &[Value]) -> Value {
  let mut system = request.system_prompt.clone().unwrap_or_default();
  if let (Some(schema), false) = (&request.output_schema, request.tools.is_empty()) {
    if !system.is_empty() {
      system.push_str("\n\n");
    }
    system.push_str(&prompts::output_format_instruction(schema));
  }

  let mut body = json!({ "contents": contents });
  if !system.is_empty() {
    body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
  }

  if !request.tools.is_empty() {
    let declarations: Vec<Value> = request
      .tools
      .iter()
      .map(|t| {
        json!({
          "name": t.name,
          "description": t.description,
          "parameters": t.input_schema
        })
      })
      .collect();
    body["tools"] = json!([{ "functionDeclarations": declarations }]);
  } else if let Some(schema) = &request.output_schema {
    body["generationConfig"] = json!({
      "responseMimeType": "application/json",
      "responseSchema": schema
    });
  }
  body
}

fn candidate_parts(reply: &Value) -> Vec<Value> {
  reply["candidates"][0]["content"]["parts"]
    .as_array()
    .cloned()
    .unwrap_or_default()
}

fn function_calls(parts: &[Value]) -> Vec<(String, Value)> {
  parts
    .iter()
    .filter_map(|part| part.get("functionCall"))
    .map(|fc| {
      let name = fc["name"].as_str().unwrap_or_default().to_string();
      let args = match fc.get("args") {
        Some(args) if args.is_object() => args.clone(),
        _ => json!({}),
      };
      (name, args)
    })
    .collect()
}

fn collect_text(parts: &[Value]) -> String {
  parts
    .iter()
    .filter(|p| !p["thought"].as_bool().unwrap_or(false))
    .filter_map(|p| p["text"].as_str())
    .collect()
}

/// Final model text as output: a JSON object when the text is one (code
/// fences allowed), the text itself otherwise, `None` when blank.
pub fn parse_output(text: &str) -> Option<Value> {
  let trimmed = text.trim();
  if trimmed.is_empty() {
    return None;
  }
  match serde_json::from_str::<Value>(strip_code_fence(trimmed)) {
    Ok(value @ Value::Object(_)) => Some(value),
    Ok(Value::String(s)) => Some(Value::String(s)),
    _ => Some(Value::String(trimmed.to_string())),
  }
}

fn strip_code_fence(text: &str) -> &str {
  let Some(rest) = text.strip_prefix("```") else {
    return text;
  };
  let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
  body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

pub struct GeminiSpeech {
  client: GeminiClient,
  model: String,
  voice: String,
}

impl GeminiSpeech {
  pub fn new(client: GeminiClient, model: &str, voice: &str) -> Self {
    Self {
      client,
      model: model.to_string(),
      voice: voice.to_string(),
    }
  }
}

#[async_trait]
impl SpeechSynthesizer for GeminiSpeech {
  async fn synthesize(&self, text: &str, language: &str) -> Result<String, SpeechError> {
    let body = json!({
      "contents": [{ "role": "user", "parts": [{ "text": text }] }],
      "generationConfig": {
        "responseModalities": ["AUDIO"],
        "speechConfig": {
          "languageCode": speech_language_code(language),
          "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": self.voice } }
        }
      }
    });

    let reply = self
      .client
      .generate_content(&self.model, &body)
      .await
      .map_err(|err| SpeechError::Request(err.message))?;

    let inline = candidate_parts(&reply)
      .into_iter()
      .find_map(|p| p.get("inlineData").cloned())
      .ok_or(SpeechError::NoAudio)?;
    let mime = inline["mimeType"].as_str().unwrap_or_default();
    let data = inline["data"].as_str().ok_or(SpeechError::NoAudio)?;
    let pcm = STANDARD
      .decode(data)
      .map_err(|err| SpeechError::InvalidAudio(err.to_string()))?;

    Ok(data_uri::encode("audio/wav", &pcm_to_wav(&pcm, sample_rate(mime), 1)))
  }
}

/// BCP-47 code for the TTS model; bare Indian-language codes get an `-IN` region.
fn speech_language_code(language: &str) -> String {
  match language {
    "en" => "en-US".to_string(),
    "hi" | "te" | "ta" | "kn" | "mr" | "bn" | "gu" | "ml" | "pa" => format!("{language}-IN"),
    other => other.to_string(),
  }
}

/// Rate from a mime such as `audio/L16;codec=pcm;rate=24000`.
fn sample_rate(mime: &str) -> u32 {
  mime
    .split(';')
    .filter_map(|param| param.trim().strip_prefix("rate="))
    .find_map(|rate| rate.parse().ok())
    .unwrap_or(24_000)
}

/// Wraps signed 16-bit little-endian PCM in a WAV container.
pub fn pcm_to_wav(pcm: &[u8], sample_rate: u32, channels: u16) -> Vec<u8> {
  let bits_per_sample: u16 = 16;
  let block_align = channels * bits_per_sample / 8;
  let byte_rate = sample_rate * u32::from(block_align);
  let data_len = pcm.len() as u32;

  let mut wav = Vec::with_capacity(44 + pcm.len());
  wav.extend_from_slice(b"RIFF");
  wav.extend_from_slice(&(36 + data_len).to_le_bytes());
  wav.extend_from_slice(b"WAVE");
  wav.extend_from_slice(b"fmt ");
  wav.extend_from_slice(&16u32.to_le_bytes());
  wav.extend_from_slice(&1u16.to_le_bytes());
  wav.extend_from_slice(&channels.to_le_bytes());
  wav.extend_from_slice(&sample_rate.to_le_bytes());
  wav.extend_from_slice(&byte_rate.to_le_bytes());
  wav.extend_from_slice(&block_align.to_le_bytes());
  wav.extend_from_slice(&bits_per_sample.to_le_bytes());
  wav.extend_from_slice(b"data");
  wav.extend_from_slice(&data_len.to_le_bytes());
  wav.extend_from_slice(pcm);
  wav
}
