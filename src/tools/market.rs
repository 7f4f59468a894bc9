use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::districts::districts_in;
use super::{parse_input, to_output, Tool, ToolDefinition};
use crate::error::ToolError;

const NAME: &str = "getMarketPrices";
const NEIGHBOUR_MARKETS: usize = 3;
const DEFAULT_BASE_PRICE: u32 = 2000;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Demand {
  High,
  Medium,
  Low,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trend {
  Up,
  Stable,
  Down,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MarketQuote {
  pub name: String,
  /// INR per quintal
  pub price: u32,
  pub demand: Demand,
  pub trend: Trend,
}

/// Base price in INR per quintal.
pub fn base_price(crop_name: &str) -> u32 {
  match crop_name.trim().to_lowercase().as_str() {
    "tomato" => 2500,
    "corn" => 2100,
    "wheat" => 2300,
    "soybean" => 4500,
    "cotton" => 6000,
    _ => DEFAULT_BASE_PRICE,
  }
}

/// Simulated quotes for the caller's own district market plus up to three
/// other districts of the same state, highest price first.
pub fn market_prices<R: Rng>(crop_name: &str, district: &str, state: &str, rng: &mut R) -> Vec<MarketQuote> {
  let district = district.trim();
  let state = state.trim();
  if district.is_empty() || state.is_empty() {
    return Vec::new();
  }

  let others: Vec<&str> = districts_in(state)
    .iter()
    .copied()
    .filter(|d| !d.eq_ignore_ascii_case(district))
    .collect();

  let mut names = vec![format!("{district} Central Mandi")];
  names.extend(
    others
      .choose_multiple(rng, NEIGHBOUR_MARKETS)
      .map(|d| format!("{d} Market")),
  );

  let base = base_price(crop_name);
  let spread = base / 10;
  let mut quotes: Vec<MarketQuote> = names
    .into_iter()
    .map(|name| MarketQuote {
      name,
      price: rng.gen_range(base - spread..base + spread),
      demand: match rng.gen::<f64>() {
        r if r > 0.66 => Demand::High,
        r if r > 0.33 => Demand::Medium,
        _ => Demand::Low,
      },
      trend: match rng.gen::<f64>() {
        r if r > 0.66 => Trend::Up,
        r if r > 0.33 => Trend::Stable,
        _ => Trend::Down,
      },
    })
    .collect();

  quotes.sort_by(|a, b| b.price.cmp(&a.price));
  for idx in 1..quotes.len() {
    let ceiling = quotes[idx - 1].price.saturating_sub(1);
    if quotes[idx].price > ceiling {
      quotes[idx].price = ceiling;
    }
  }
  quotes
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarketQuery {
  crop_name: String,
  #[serde(default)]
  district: String,
  #[serde(default)]
  state: String,
}

pub struct MarketPricesTool;

impl Tool for MarketPricesTool {
  fn definition(&self) -> ToolDefinition {
    ToolDefinition {
      name: NAME.to_string(),
      description: "Get simulated real-time market prices for a given crop in nearby markets.".to_string(),
      input_schema: json!({
        "type": "object",
        "properties": {
          "cropName": { "type": "string", "description": "The name of the crop." },
          "district": { "type": "string", "description": "The user's district." },
          "state": { "type": "string", "description": "The user's state." }
        },
        "required": ["cropName"]
      }),
      output_schema: json!({
        "type": "array",
        "items": {
          "type": "object",
          "properties": {
            "name": { "type": "string", "description": "The name of the market (mandi)." },
            "price": { "type": "number", "description": "The current price per quintal in INR." },
            "demand": { "type": "string", "enum": ["High", "Medium", "Low"] },
            "trend": { "type": "string", "enum": ["Up", "Stable", "Down"] }
          },
          "required": ["name", "price", "demand", "trend"]
        }
      }),
    }
  }

  fn call(&self, input: Value) -> Result<Value, ToolError> {
    let query: MarketQuery = parse_input(NAME, input)?;
    info!(crop = %query.crop_name, district = %query.district, state = %query.state, "getting market prices");
    let quotes = market_prices(&query.crop_name, &query.district, &query.state, &mut rand::thread_rng());
    to_output(NAME, &quotes)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  #[test]
  fn missing_district_or_state_yields_nothing() {
    let mut rng = StdRng::seed_from_u64(1);
    assert!(market_prices("wheat", "", "Punjab", &mut rng).is_empty());
    assert!(market_prices("wheat", "Ludhiana", "  ", &mut rng).is_empty());
  }

  #[test]
  fn own_district_appears_exactly_once() {
    for seed in 0..50 {
      let quotes = market_prices("tomato", "Pune", "Maharashtra", &mut StdRng::seed_from_u64(seed));
      assert_eq!(quotes.len(), 4);
      let own = quotes.iter().filter(|q| q.name.starts_with("Pune ")).count();
      assert_eq!(own, 1, "seed {seed}");
      assert!(quotes.iter().any(|q| q.name == "Pune Central Mandi"));
    }
  }

  #[test]
  fn neighbour_markets_are_distinct() {
    for seed in 0..50 {
      let quotes = market_prices("cotton", "Guntur", "Andhra Pradesh", &mut StdRng::seed_from_u64(seed));
      let mut names: Vec<&str> = quotes.iter().map(|q| q.name.as_str()).collect();
      names.sort_unstable();
      names.dedup();
      assert_eq!(names.len(), quotes.len());
    }
  }

  #[test]
  fn prices_are_strictly_descending() {
    for seed in 0..200 {
      let quotes = market_prices("corn", "Nashik", "Maharashtra", &mut StdRng::seed_from_u64(seed));
      for pair in quotes.windows(2) {
        assert!(pair[0].price > pair[1].price, "seed {seed}: {quotes:?}");
      }
    }
  }

  #[test]
  fn prices_stay_near_base() {
    let quotes = market_prices("soybean", "Indore", "Madhya Pradesh", &mut StdRng::seed_from_u64(9));
    for quote in &quotes {
      assert!(quote.price <= 4950 && quote.price >= 4045, "{quote:?}");
    }
  }

  #[test]
  fn unknown_state_returns_only_own_market() {
    let quotes = market_prices("rice", "Springfield", "Nowhere", &mut StdRng::seed_from_u64(3));
    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0].name, "Springfield Central Mandi");
    assert_eq!(base_price("rice"), DEFAULT_BASE_PRICE);
  }
}
