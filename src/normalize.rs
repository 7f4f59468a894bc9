use crate::error::TurnError;
use crate::models::{ChatInput, ChatRequest};

pub const DEFAULT_LANGUAGE: &str = "en";

/// Builds a typed chat input from raw UI input: missing history becomes an
/// empty sequence, a missing or blank language becomes "en".
pub fn normalize(req: ChatRequest) -> Result<ChatInput, TurnError> {
  let message = req.message.trim().to_string();
  if message.is_empty() {
    return Err(TurnError::InvalidRequest("Message must not be empty.".to_string()));
  }

  Ok(ChatInput {
    message,
    history: req.history.unwrap_or_default(),
    language: resolve_language(req.language.as_deref()),
  })
}

pub fn resolve_language(language: Option<&str>) -> String {
  match language.map(str::trim) {
    Some(code) if !code.is_empty() => code.to_string(),
    _ => DEFAULT_LANGUAGE.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::ConversationTurn;

  #[test]
  fn fills_defaults() {
    let input = normalize(ChatRequest {
      message: "Hello".to_string(),
      history: None,
      language: None,
    })
    .expect("message is present");
    assert_eq!(input.message, "Hello");
    assert!(input.history.is_empty());
    assert_eq!(input.language, "en");
  }

  #[test]
  fn keeps_history_order_and_language() {
    let history = vec![ConversationTurn::user("one"), ConversationTurn::model("two")];
    let input = normalize(ChatRequest {
      message: "three".to_string(),
      history: Some(history.clone()),
      language: Some("te".to_string()),
    })
    .expect("message is present");
    assert_eq!(input.history, history);
    assert_eq!(input.language, "te");
  }

  #[test]
  fn blank_language_falls_back_to_english() {
    assert_eq!(resolve_language(Some("  ")), "en");
    assert_eq!(resolve_language(Some("hi")), "hi");
  }

  #[test]
  fn rejects_blank_message() {
    let err = normalize(ChatRequest {
      message: "   ".to_string(),
      ..Default::default()
    })
    .unwrap_err();
    assert!(matches!(err, TurnError::InvalidRequest(_)));
  }
}
