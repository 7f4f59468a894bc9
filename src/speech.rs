//! Speech augmentation: derive speakable text from a validated response and
//! attach synthesized audio when the synthesizer succeeds.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::SpeechError;
use crate::models::ChatResponse;

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
  /// Returns a `data:audio/<mime>;base64,<..>` URI.
  async fn synthesize(&self, text: &str, language: &str) -> Result<String, SpeechError>;
}

/// The text to speak for a response, or `None` when nothing should be spoken.
///
/// Charts are spoken as "title. description" and only when both are present.
pub fn speakable_text(response: &ChatResponse) -> Option<String> {
  match response {
    ChatResponse::Text(text) if !text.trim().is_empty() => Some(text.clone()),
    ChatResponse::Text(_) => None,
    ChatResponse::Chart(chart) => {
      let title = chart.title.trim();
      let description = chart.description.trim();
      if title.is_empty() || description.is_empty() {
        None
      } else {
        Some(format!("{title}. {description}"))
      }
    }
  }
}

/// Synthesizes `text`; any failure is logged and yields no audio.
pub async fn synthesize_or_skip(
  synthesizer: Option<&dyn SpeechSynthesizer>,
  text: &str,
  language: &str,
) -> Option<String> {
  let synthesizer = synthesizer?;
  match synthesizer.synthesize(text, language).await {
    Ok(uri) if uri.starts_with("data:audio/") => Some(uri),
    Ok(_) => {
      warn!("speech synthesizer returned something other than an audio data URI");
      None
    }
    Err(err) => {
      warn!(error = %err, "error generating audio, continuing without it");
      None
    }
  }
}

/// Audio for a validated chat response, if any.
pub async fn augment(
  synthesizer: Option<&dyn SpeechSynthesizer>,
  response: &ChatResponse,
  language: &str,
) -> Option<String> {
  let Some(text) = speakable_text(response) else {
    debug!("nothing to speak, skipping audio");
    return None;
  };
  synthesize_or_skip(synthesizer, &text, language).await
}
