use serde_json::Value;
use tracing::warn;

use crate::error::TurnError;
use crate::models::ChatResponse;

/// Turns raw model output into a `ChatResponse`.
///
/// A bare string becomes a text response. Anything else must be exactly a
/// `{type: "text", data}` or `{type: "chart", data: {..}}` object; absent
/// output or any other shape is a malformed response.
pub fn validate_response(raw: Option<Value>) -> Result<ChatResponse, TurnError> {
  match raw {
    None | Some(Value::Null) => {
      warn!("model returned no output");
      Err(TurnError::MalformedResponse)
    }
    Some(Value::String(text)) => Ok(ChatResponse::Text(text)),
    Some(value) => serde_json::from_value::<ChatResponse>(value).map_err(|err| {
      warn!(error = %err, "model output matched no response shape");
      TurnError::MalformedResponse
    }),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::ChartType;
  use serde_json::json;

  #[test]
  fn bare_string_becomes_text() {
    assert_eq!(
      validate_response(Some(json!("Namaste!"))).unwrap(),
      ChatResponse::Text("Namaste!".to_string())
    );
  }

  #[test]
  fn text_object_is_accepted() {
    let response = validate_response(Some(json!({ "type": "text", "data": "Hi" }))).unwrap();
    assert_eq!(response, ChatResponse::Text("Hi".to_string()));
  }

  #[test]
  fn chart_object_is_accepted() {
    let response = validate_response(Some(json!({
      "type": "chart",
      "data": {
        "title": "7-Day Temperature Forecast",
        "description": "Average daily temperature in Celsius.",
        "chartType": "area",
        "data": [{ "name": "2024-09-23", "value": 29 }, { "name": "2024-09-24", "value": 27.5 }]
      }
    })))
    .unwrap();
    match response {
      ChatResponse::Chart(chart) => {
        assert_eq!(chart.chart_type, ChartType::Area);
        assert_eq!(chart.data.len(), 2);
        assert_eq!(chart.data[1].value, 27.5);
      }
      other => panic!("expected chart, got {other:?}"),
    }
  }

  #[test]
  fn absent_output_is_malformed() {
    assert_eq!(validate_response(None), Err(TurnError::MalformedResponse));
    assert_eq!(validate_response(Some(Value::Null)), Err(TurnError::MalformedResponse));
  }

  #[test]
  fn shapes_outside_the_union_are_malformed() {
    let cases = [
      json!({ "type": "table", "data": [] }),
      json!({ "type": "text", "data": { "title": "x" } }),
      json!({ "type": "chart", "data": "sunny" }),
      json!({ "type": "chart", "data": { "title": "t", "description": "d", "chartType": "radar", "data": [] } }),
      json!({ "data": "no tag" }),
      json!(42),
      json!(["text", "hi"]),
    ];
    for case in cases {
      assert_eq!(validate_response(Some(case.clone())), Err(TurnError::MalformedResponse), "{case}");
    }
  }
}
