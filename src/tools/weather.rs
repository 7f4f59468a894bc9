use chrono::{Days, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::{parse_input, to_output, Tool, ToolDefinition};
use crate::error::ToolError;

const NAME: &str = "getWeather";
const MAX_DAYS: u32 = 366;
const CONDITIONS: [&str; 7] = [
  "Sunny",
  "Partly Cloudy",
  "Clear Skies",
  "Light Rain",
  "Thunderstorms",
  "Overcast",
  "Scattered Showers",
];

#[derive(Deserialize, Debug)]
pub struct WeatherQuery {
  pub city: String,
  #[serde(default = "default_days")]
  pub days: u32,
}

fn default_days() -> u32 {
  1
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyWeather {
  /// YYYY-MM-DD
  pub date: String,
  /// Celsius
  pub temperature: i32,
  pub condition: String,
  /// Percent
  pub humidity: u32,
  /// km/h
  pub wind_speed: u32,
}

/// Mock forecast of `days` entries, one per day starting at `today`.
pub fn forecast<R: Rng>(days: u32, today: NaiveDate, rng: &mut R) -> Vec<DailyWeather> {
  (0..days)
    .map(|offset| DailyWeather {
      date: (today + Days::new(u64::from(offset))).format("%Y-%m-%d").to_string(),
      temperature: rng.gen_range(21..=32),
      condition: CONDITIONS[rng.gen_range(0..CONDITIONS.len())].to_string(),
      humidity: rng.gen_range(40..90),
      wind_speed: rng.gen_range(5..25),
    })
    .collect()
}

pub struct WeatherTool;

impl Tool for WeatherTool {
  fn definition(&self) -> ToolDefinition {
    ToolDefinition {
      name: NAME.to_string(),
      description: "Get the current weather and a multi-day forecast for a specific location.".to_string(),
      input_schema: json!({
        "type": "object",
        "properties": {
          "city": { "type": "string", "description": "The city for which to get the weather." },
          "days": {
            "type": "integer",
            "minimum": 1,
            "maximum": MAX_DAYS,
            "description": "The number of days to forecast (1 for today, 7 for a week). Defaults to 1."
          }
        },
        "required": ["city"]
      }),
      output_schema: json!({
        "type": "array",
        "items": {
          "type": "object",
          "properties": {
            "date": { "type": "string", "description": "YYYY-MM-DD" },
            "temperature": { "type": "number", "description": "Average temperature in Celsius." },
            "condition": { "type": "string" },
            "humidity": { "type": "number", "description": "Humidity percentage." },
            "windSpeed": { "type": "number", "description": "Wind speed in km/h." }
          },
          "required": ["date", "temperature", "condition", "humidity", "windSpeed"]
        }
      }),
    }
  }

  fn call(&self, input: Value) -> Result<Value, ToolError> {
    let query: WeatherQuery = parse_input(NAME, input)?;
    info!(city = %query.city, days = query.days, "getting weather");
    let days = forecast(query.days, Utc::now().date_naive(), &mut rand::thread_rng());
    to_output(NAME, &days)
  }
}
