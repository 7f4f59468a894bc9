use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::{parse_input, to_output, Tool, ToolDefinition};
use crate::error::ToolError;

const NAME: &str = "getSuggestions";
const FALLBACK: &str = "No suggestions available for this topic.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Topic {
  PestControl,
  CropRotation,
  SoilHealth,
  Irrigation,
  Harvesting,
}

impl Topic {
  pub const ALL: [Topic; 5] = [
    Topic::PestControl,
    Topic::CropRotation,
    Topic::SoilHealth,
    Topic::Irrigation,
    Topic::Harvesting,
  ];

  pub fn label(self) -> &'static str {
    match self {
      Topic::PestControl => "pest control",
      Topic::CropRotation => "crop rotation",
      Topic::SoilHealth => "soil health",
      Topic::Irrigation => "irrigation",
      Topic::Harvesting => "harvesting",
    }
  }

  pub fn parse(label: &str) -> Option<Topic> {
    Topic::ALL.into_iter().find(|t| t.label() == label)
  }

  pub fn suggestions(self) -> &'static [&'static str] {
    match self {
      Topic::PestControl => &[
        "Introduce beneficial insects like ladybugs to control aphids.",
        "Use neem oil as a natural pesticide.",
        "Practice crop rotation to disrupt pest life cycles.",
      ],
      Topic::CropRotation => &[
        "Alternate between legumes (like beans) and heavy feeders (like corn).",
        "Avoid planting crops from the same family in the same spot year after year.",
        "Plant cover crops like clover or rye during the off-season to improve soil.",
      ],
      Topic::SoilHealth => &[
        "Add compost to increase organic matter.",
        "Test your soil pH and amend as needed.",
        "Minimize tilling to protect soil structure and microbial life.",
      ],
      Topic::Irrigation => &[
        "Use drip irrigation to deliver water directly to the plant roots and reduce waste.",
        "Water early in the morning to minimize evaporation.",
        "Mulch around plants to retain soil moisture.",
      ],
      Topic::Harvesting => &[
        "Harvest during the coolest part of the day, usually early morning, to keep produce fresh.",
        "Check for visual cues of ripeness, such as color, size, and firmness.",
        "Use clean, sharp tools to avoid damaging the plant and the produce.",
        "Handle harvested produce gently to prevent bruising.",
        "Store produce in a cool, shaded, and well-ventilated area immediately after harvesting.",
      ],
    }
  }
}

/// Suggestions for a topic label; an unrecognised label yields the single fallback line.
pub fn suggestions_for(label: &str) -> Vec<String> {
  match Topic::parse(label) {
    Some(topic) => topic.suggestions().iter().map(|s| s.to_string()).collect(),
    None => vec![FALLBACK.to_string()],
  }
}

#[derive(Deserialize)]
struct SuggestionQuery {
  topic: String,
}

pub struct SuggestionsTool;

impl Tool for SuggestionsTool {
  fn definition(&self) -> ToolDefinition {
    let topics: Vec<&str> = Topic::ALL.iter().map(|t| t.label()).collect();
    ToolDefinition {
      name: NAME.to_string(),
      description: "Get farming suggestions for a specific topic.".to_string(),
      input_schema: json!({
        "type": "object",
        "properties": {
          "topic": {
            "type": "string",
            "enum": topics,
            "description": "The topic for which to get suggestions."
          }
        },
        "required": ["topic"]
      }),
      output_schema: json!({
        "type": "array",
        "items": { "type": "string" },
        "description": "A list of suggestions."
      }),
    }
  }

  fn call(&self, input: Value) -> Result<Value, ToolError> {
    let query: SuggestionQuery = parse_input(NAME, input)?;
    info!(topic = %query.topic, "getting suggestions");
    to_output(NAME, &suggestions_for(&query.topic))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_topic_has_suggestions() {
    for topic in Topic::ALL {
      assert!(!topic.suggestions().is_empty(), "{}", topic.label());
    }
    assert_eq!(suggestions_for("harvesting").len(), 5);
  }

  #[test]
  fn labels_parse_back_to_their_topic() {
    for topic in Topic::ALL {
      assert_eq!(Topic::parse(topic.label()), Some(topic));
    }
    assert_eq!(Topic::parse("Pest Control"), None);
  }

  #[test]
  fn unmatched_topic_falls_back_to_single_line() {
    assert_eq!(suggestions_for("beekeeping"), vec![FALLBACK.to_string()]);
  }
}
