//! Error taxonomy shared by the flows.

use thiserror::Error;

/// Signature of an overloaded upstream model service.
pub const TRANSIENT_SIGNATURE: &str = "503 Service Unavailable";

pub const MALFORMED_RESPONSE: &str = "The response format was unexpected after processing.";

/// Failure raised by a model backend. The message is kept verbatim so the
/// failure classifier can inspect it.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct ModelError {
  pub message: String,
}

impl ModelError {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
    }
  }
}

impl From<reqwest::Error> for ModelError {
  fn from(err: reqwest::Error) -> Self {
    Self::new(err.to_string())
  }
}

#[derive(Debug, Error)]
pub enum SpeechError {
  #[error("speech request failed: {0}")]
  Request(String),
  #[error("speech response carried no audio")]
  NoAudio,
  #[error("invalid audio payload: {0}")]
  InvalidAudio(String),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ToolError {
  #[error("unknown tool '{0}'")]
  UnknownTool(String),
  #[error("invalid input for '{tool}': {reason}")]
  InvalidInput { tool: String, reason: String },
  #[error("tool '{tool}' produced output outside its schema: {reason}")]
  InvalidOutput { tool: String, reason: String },
}

/// Errors surfaced to callers of the flows.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TurnError {
  #[error("{0}")]
  InvalidRequest(String),
  #[error("{}", MALFORMED_RESPONSE)]
  MalformedResponse,
  #[error("{0}")]
  Upstream(String),
}

impl From<ModelError> for TurnError {
  fn from(err: ModelError) -> Self {
    if err.message.trim().is_empty() {
      TurnError::Upstream("An unknown error occurred while processing your request.".to_string())
    } else {
      TurnError::Upstream(err.message)
    }
  }
}

/// True when the message says the model service is temporarily overloaded.
pub fn is_transient(message: &str) -> bool {
  message.contains(TRANSIENT_SIGNATURE)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn classifies_overload_message_as_transient() {
    assert!(is_transient(
      "Gemini API error (503 Service Unavailable): The model is overloaded."
    ));
    assert!(!is_transient("Gemini API error (500 Internal Server Error): boom"));
    assert!(!is_transient("503"));
  }

  #[test]
  fn empty_model_error_gets_generic_message() {
    let err: TurnError = ModelError::new("  ").into();
    assert_eq!(
      err,
      TurnError::Upstream("An unknown error occurred while processing your request.".to_string())
    );
  }

  #[test]
  fn model_error_message_is_preserved() {
    let err: TurnError = ModelError::new("quota exceeded").into();
    assert_eq!(err.to_string(), "quota exceeded");
  }
}
