use async_trait::async_trait;
use serde_json::Value;

use crate::error::ModelError;
use crate::models::{ConversationTurn, Part};
use crate::tools::ToolDefinition;

/// One generation request to the hosted model.
#[derive(Clone, Debug, Default)]
pub struct ModelRequest {
  pub system_prompt: Option<String>,
  pub history: Vec<ConversationTurn>,
  /// The new user turn.
  pub prompt: Vec<Part>,
  pub language: String,
  /// Tools the model may call before answering.
  pub tools: Vec<ToolDefinition>,
  /// JSON schema the final answer should follow.
  pub output_schema: Option<Value>,
}

/// Boundary to the language model. Implementations run any tool calls the
/// model makes and return its final output: a JSON object when the model
/// answered with one, a bare string otherwise, `None` when it said nothing.
#[async_trait]
pub trait ModelBackend: Send + Sync {
  async fn generate(&self, request: ModelRequest) -> Result<Option<Value>, ModelError>;
}
