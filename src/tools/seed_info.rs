use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::{parse_input, to_output, Tool, ToolDefinition};
use crate::error::ToolError;

const NAME: &str = "getSeedInfo";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct VarietyInfo {
  pub name: String,
  #[serde(rename = "yield")]
  pub yield_range: String,
  pub duration: String,
  pub characteristics: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeedInfo {
  pub varieties: Vec<VarietyInfo>,
  pub sowing_season: String,
  pub average_price_per_kg: u32,
  pub common_pests: Vec<String>,
  pub common_diseases: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum SeedLookup {
  Found(SeedInfo),
  NotFound { error: String },
}

fn variety(name: &str, yield_range: &str, duration: &str, characteristics: &[&str]) -> VarietyInfo {
  VarietyInfo {
    name: name.to_string(),
    yield_range: yield_range.to_string(),
    duration: duration.to_string(),
    characteristics: characteristics.iter().map(|c| c.to_string()).collect(),
  }
}

fn strings(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| s.to_string()).collect()
}

/// Known crops, in lookup order.
pub fn catalog() -> Vec<(&'static str, SeedInfo)> {
  vec![
    (
      "rice",
      SeedInfo {
        varieties: vec![
          variety("IR-64", "20-25 quintals/acre", "120-130 days", &["Good cooking quality", "Susceptible to blast disease"]),
          variety("Sona Masuri", "25-30 quintals/acre", "130-140 days", &["Premium fine grain", "Lower yield but higher market price"]),
          variety("Basmati-370", "15-20 quintals/acre", "140-150 days", &["Aromatic long grain", "Requires careful water management"]),
          variety("Pusa Basmati-1121", "18-22 quintals/acre", "145-155 days", &["World's longest rice grain", "High demand in export markets"]),
        ],
        sowing_season: "Kharif (June-July) and Rabi (Nov-Dec)".to_string(),
        average_price_per_kg: 45,
        common_pests: strings(&["Stem Borer", "Leaf Folder", "Brown Plant Hopper"]),
        common_diseases: strings(&["Blast", "Bacterial Blight", "Sheath Blight"]),
      },
    ),
    (
      "wheat",
      SeedInfo {
        varieties: vec![
          variety("HD-2967", "20-22 quintals/acre", "150-155 days", &["High yield potential", "Good resistance to rust"]),
          variety("PBW-550", "19-21 quintals/acre", "145-150 days", &["Widely adapted", "Good chapati making quality"]),
          variety("WH-1105", "22-24 quintals/acre", "155-160 days", &["Excellent yield", "Requires timely irrigation"]),
        ],
        sowing_season: "Rabi (October-December)".to_string(),
        average_price_per_kg: 30,
        common_pests: strings(&["Aphids", "Termites"]),
        common_diseases: strings(&["Rust", "Smut", "Powdery Mildew"]),
      },
    ),
    (
      "corn",
      SeedInfo {
        varieties: vec![
          variety("Pioneer 3396", "35-40 quintals/acre", "110-115 days", &["High yield hybrid", "Good drought tolerance", "Excellent stay-green trait"]),
          variety("Syngenta NK30", "30-35 quintals/acre", "105-110 days", &["Early maturity", "Good resistance to stalk rot", "Suitable for both grain and fodder"]),
          variety("DEKALB 900M Gold", "38-42 quintals/acre", "115-120 days", &["High shelling percentage", "Strong plant structure", "Tolerant to major diseases"]),
        ],
        sowing_season: "Kharif (June-July)".to_string(),
        average_price_per_kg: 250,
        common_pests: strings(&["Fall Armyworm", "Corn Earworm", "Stem Borer"]),
        common_diseases: strings(&["Maydis Leaf Blight", "Common Rust"]),
      },
    ),
    (
      "tomato",
      SeedInfo {
        varieties: vec![
          variety("Pusa Ruby", "10-12 tons/acre", "60-70 days after transplanting", &["Determinate variety", "Good for processing", "Early maturing"]),
          variety("Arka Rakshak", "35-40 tons/acre", "120-130 days", &["High yield hybrid", "Triple disease resistance (ToLCV, BW, EB)", "Good shelf life"]),
          variety("Heirloom Guntur Sannam", "8-10 tons/acre", "80-90 days", &["Spicy and tangy taste", "Prized for local markets and traditional cooking", "Lower yield but unique flavor"]),
        ],
        sowing_season: "Year-round, with peaks in Jan-Feb, June-July, and Sept-Oct".to_string(),
        average_price_per_kg: 900,
        common_pests: strings(&["Fruit Borer", "Whitefly", "Thrips"]),
        common_diseases: strings(&["Early Blight", "Late Blight", "Tomato Mosaic Virus"]),
      },
    ),
  ]
}

/// Looks up seed information for free-text input.
///
/// A variety named anywhere in the query wins and is returned alone inside
/// its crop's record; otherwise a crop key named in the query returns the
/// whole crop; otherwise an `{error}` record.
pub fn lookup(crop_name: &str) -> SeedLookup {
  let query = crop_name.to_lowercase();
  let crops = catalog();

  for (_, info) in &crops {
    if let Some(found) = info
      .varieties
      .iter()
      .find(|v| query.contains(&v.name.to_lowercase()))
    {
      return SeedLookup::Found(SeedInfo {
        varieties: vec![found.clone()],
        ..info.clone()
      });
    }
  }

  if let Some((_, info)) = crops.into_iter().find(|(key, _)| query.contains(key)) {
    return SeedLookup::Found(info);
  }

  SeedLookup::NotFound {
    error: format!("Information not available for '{crop_name}'."),
  }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedQuery {
  crop_name: String,
}

pub struct SeedInfoTool;

impl Tool for SeedInfoTool {
  fn definition(&self) -> ToolDefinition {
    let string_list = json!({ "type": "array", "items": { "type": "string" } });
    ToolDefinition {
      name: NAME.to_string(),
      description: "Get detailed information about seeds for a specific crop, including details on varieties, sowing season, price, pests, and diseases. Can also query for a specific variety within a crop.".to_string(),
      input_schema: json!({
        "type": "object",
        "properties": {
          "cropName": {
            "type": "string",
            "description": "The name of the crop or specific seed variety (e.g. \"rice\", \"wheat\", \"IR-64 rice\", \"Pioneer 3396\")."
          }
        },
        "required": ["cropName"]
      }),
      output_schema: json!({
        "anyOf": [
          {
            "type": "object",
            "properties": {
              "varieties": {
                "type": "array",
                "items": {
                  "type": "object",
                  "properties": {
                    "name": { "type": "string" },
                    "yield": { "type": "string" },
                    "duration": { "type": "string" },
                    "characteristics": string_list
                  },
                  "required": ["name", "yield", "duration", "characteristics"]
                }
              },
              "sowingSeason": { "type": "string" },
              "averagePricePerKg": { "type": "number" },
              "commonPests": string_list,
              "commonDiseases": string_list
            },
            "required": ["varieties", "sowingSeason", "averagePricePerKg", "commonPests", "commonDiseases"]
          },
          {
            "type": "object",
            "properties": { "error": { "type": "string" } },
            "required": ["error"]
          }
        ]
      }),
    }
  }

  fn call(&self, input: Value) -> Result<Value, ToolError> {
    let query: SeedQuery = parse_input(NAME, input)?;
    info!(crop = %query.crop_name, "getting seed info");
    to_output(NAME, &lookup(&query.crop_name))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn found(result: SeedLookup) -> SeedInfo {
    match result {
      SeedLookup::Found(info) => info,
      SeedLookup::NotFound { error } => panic!("unexpected not-found: {error}"),
    }
  }

  #[test]
  fn variety_query_returns_only_that_variety() {
    let info = found(lookup("IR-64 rice"));
    assert_eq!(info.varieties.len(), 1);
    assert_eq!(info.varieties[0].name, "IR-64");
    assert_eq!(info.sowing_season, "Kharif (June-July) and Rabi (Nov-Dec)");
  }

  #[test]
  fn variety_match_is_case_insensitive() {
    let info = found(lookup("tell me about pioneer 3396"));
    assert_eq!(info.varieties[0].name, "Pioneer 3396");
    assert_eq!(info.average_price_per_kg, 250);
  }

  #[test]
  fn crop_query_returns_all_varieties() {
    let info = found(lookup("Wheat"));
    assert_eq!(info.varieties.len(), 3);
  }

  #[test]
  fn unknown_crop_is_an_error_record() {
    assert_eq!(
      lookup("quinoa"),
      SeedLookup::NotFound {
        error: "Information not available for 'quinoa'.".to_string()
      }
    );
  }

  #[test]
  fn error_record_serializes_as_plain_object() {
    let value = serde_json::to_value(lookup("Quinoa")).unwrap();
    assert_eq!(value, json!({ "error": "Information not available for 'Quinoa'." }));
  }
}
