//! Tool registry.
//!
//! Tools are named, schema-typed functions the model may call to ground an
//! answer in data. Each tool declares JSON schemas for its input and its
//! output; the registry checks both on every invocation. Domain failures
//! such as an unknown crop are returned as data (`{"error": ..}`) and are
//! covered by the output schema.

pub mod districts;
pub mod market;
pub mod seed_info;
pub mod suggestions;
pub mod weather;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ToolError;
use crate::schema;

pub use market::MarketPricesTool;
pub use seed_info::SeedInfoTool;
pub use suggestions::SuggestionsTool;
pub use weather::WeatherTool;

/// Tools the conversational agent advertises to the model.
pub const CHAT_TOOLS: [&str; 3] = ["getWeather", "getSuggestions", "getSeedInfo"];

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
  pub name: String,
  pub description: String,
  pub input_schema: Value,
  pub output_schema: Value,
}

pub trait Tool: Send + Sync {
  fn definition(&self) -> ToolDefinition;

  /// Runs the tool on input that already passed the input schema.
  fn call(&self, input: Value) -> Result<Value, ToolError>;
}

#[derive(Clone, Default)]
pub struct ToolRegistry {
  tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Weather, suggestions, seed info and market prices.
  pub fn farm_defaults() -> Self {
    let mut registry = Self::new();
    registry.register(WeatherTool);
    registry.register(SuggestionsTool);
    registry.register(SeedInfoTool);
    registry.register(MarketPricesTool);
    registry
  }

  /// Adds a tool, replacing any tool already registered under the same name.
  pub fn register(&mut self, tool: impl Tool + 'static) {
    let name = tool.definition().name;
    self.tools.retain(|t| t.definition().name != name);
    self.tools.push(Arc::new(tool));
  }

  pub fn definitions(&self) -> Vec<ToolDefinition> {
    self.tools.iter().map(|t| t.definition()).collect()
  }

  /// Definitions for the named tools, in the order given; unknown names are skipped.
  pub fn definitions_for(&self, names: &[&str]) -> Vec<ToolDefinition> {
    names
      .iter()
      .filter_map(|name| self.find(name).map(|t| t.definition()))
      .collect()
  }

  pub fn invoke(&self, name: &str, input: Value) -> Result<Value, ToolError> {
    let tool = self
      .find(name)
      .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
    let definition = tool.definition();

    schema::validate(&input, &definition.input_schema).map_err(|reason| ToolError::InvalidInput {
      tool: name.to_string(),
      reason,
    })?;

    debug!(tool = name, "invoking tool");
    let output = tool.call(input)?;

    if let Err(reason) = schema::validate(&output, &definition.output_schema) {
      warn!(tool = name, %reason, "tool output failed its schema");
      return Err(ToolError::InvalidOutput {
        tool: name.to_string(),
        reason,
      });
    }
    Ok(output)
  }

  fn find(&self, name: &str) -> Option<&Arc<dyn Tool>> {
    self.tools.iter().find(|t| t.definition().name == name)
  }
}

pub(crate) fn parse_input<T: serde::de::DeserializeOwned>(tool: &str, input: Value) -> Result<T, ToolError> {
  serde_json::from_value(input).map_err(|err| ToolError::InvalidInput {
    tool: tool.to_string(),
    reason: err.to_string(),
  })
}

pub(crate) fn to_output<T: Serialize>(tool: &str, output: &T) -> Result<Value, ToolError> {
  serde_json::to_value(output).map_err(|err| ToolError::InvalidOutput {
    tool: tool.to_string(),
    reason: err.to_string(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  struct Broken;

  impl Tool for Broken {
    fn definition(&self) -> ToolDefinition {
      ToolDefinition {
        name: "broken".to_string(),
        description: "Returns a string where a number is declared.".to_string(),
        input_schema: json!({ "type": "object" }),
        output_schema: json!({ "type": "number" }),
      }
    }

    fn call(&self, _input: Value) -> Result<Value, ToolError> {
      Ok(json!("not a number"))
    }
  }

  #[test]
  fn farm_defaults_register_four_tools() {
    let names: Vec<String> = ToolRegistry::farm_defaults()
      .definitions()
      .into_iter()
      .map(|d| d.name)
      .collect();
    assert_eq!(names, vec!["getWeather", "getSuggestions", "getSeedInfo", "getMarketPrices"]);
  }

  #[test]
  fn chat_tools_exclude_market_prices() {
    let defs = ToolRegistry::farm_defaults().definitions_for(&CHAT_TOOLS);
    assert_eq!(defs.len(), 3);
    assert!(defs.iter().all(|d| d.name != "getMarketPrices"));
  }

  #[test]
  fn unknown_tool_is_an_error() {
    let err = ToolRegistry::farm_defaults().invoke("getRainfall", json!({})).unwrap_err();
    assert_eq!(err, ToolError::UnknownTool("getRainfall".to_string()));
  }

  #[test]
  fn input_is_checked_against_schema() {
    let err = ToolRegistry::farm_defaults()
      .invoke("getSuggestions", json!({ "topic": "astrology" }))
      .unwrap_err();
    assert!(matches!(err, ToolError::InvalidInput { .. }));

    let err = ToolRegistry::farm_defaults()
      .invoke("getWeather", json!({ "city": "Pune", "days": 0 }))
      .unwrap_err();
    assert!(matches!(err, ToolError::InvalidInput { .. }));
  }

  #[test]
  fn output_is_checked_against_schema() {
    let mut registry = ToolRegistry::new();
    registry.register(Broken);
    let err = registry.invoke("broken", json!({})).unwrap_err();
    assert!(matches!(err, ToolError::InvalidOutput { .. }));
  }

  #[test]
  fn not_found_seed_lookup_is_valid_output() {
    let out = ToolRegistry::farm_defaults()
      .invoke("getSeedInfo", json!({ "cropName": "quinoa" }))
      .expect("error records are data");
    assert_eq!(out, json!({ "error": "Information not available for 'quinoa'." }));
  }

  #[test]
  fn every_tool_output_passes_its_schema() {
    let registry = ToolRegistry::farm_defaults();
    registry.invoke("getWeather", json!({ "city": "Nashik", "days": 7 })).unwrap();
    registry.invoke("getSuggestions", json!({ "topic": "harvesting" })).unwrap();
    registry.invoke("getSeedInfo", json!({ "cropName": "Pioneer 3396" })).unwrap();
    registry
      .invoke(
        "getMarketPrices",
        json!({ "cropName": "tomato", "district": "Pune", "state": "Maharashtra" }),
      )
      .unwrap();
  }
}
