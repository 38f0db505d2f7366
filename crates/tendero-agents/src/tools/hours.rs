use async_trait::async_trait;
use serde_json::{json, Value};

use tendero_llm::{Tool, ToolError};

/// Weekly schedule, one entry per day starting Monday.
const SCHEDULE: &[(&str, Option<(&str, &str)>)] = &[
    ("monday", Some(("08:00", "20:00"))),
    ("tuesday", Some(("08:00", "20:00"))),
    ("wednesday", Some(("08:00", "20:00"))),
    ("thursday", Some(("08:00", "20:00"))),
    ("friday", Some(("08:00", "21:00"))),
    ("saturday", Some(("09:00", "21:00"))),
    ("sunday", None),
];

/// Opening hours, whole week or a single day.
pub struct BusinessHours;

#[async_trait]
impl Tool for BusinessHours {
    fn name(&self) -> &str {
        "business_hours"
    }

    fn description(&self) -> &str {
        "Store opening hours. Pass a day name to get one day, or nothing for the whole week."
    }

    fn parameter_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "day": {
                    "type": "string",
                    "description": "English day name, lowercase (e.g. \"monday\")"
                }
            }
        })
    }

    async fn execute(&self, params: Value) -> Result<Value, ToolError> {
        let day = params.get("day").and_then(Value::as_str);
        match day {
            Some(day) => {
                let entry = SCHEDULE
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(day))
                    .ok_or_else(|| ToolError(format!("unknown day: {}", day)))?;
                Ok(day_entry(entry))
            }
            None => Ok(json!({
                "week": SCHEDULE.iter().map(day_entry).collect::<Vec<_>>()
            })),
        }
    }
}

fn day_entry((day, hours): &(&str, Option<(&str, &str)>)) -> Value {
    match hours {
        Some((open, close)) => json!({"day": day, "open": open, "close": close}),
        None => json!({"day": day, "closed": true}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn single_day_lookup() {
        let result = BusinessHours
            .execute(json!({"day": "friday"}))
            .await
            .unwrap();
        assert_eq!(result["close"], "21:00");
    }

    #[tokio::test]
    async fn sunday_is_closed() {
        let result = BusinessHours
            .execute(json!({"day": "sunday"}))
            .await
            .unwrap();
        assert_eq!(result["closed"], true);
    }

    #[tokio::test]
    async fn whole_week_has_seven_entries() {
        let result = BusinessHours.execute(json!({})).await.unwrap();
        assert_eq!(result["week"].as_array().unwrap().len(), 7);
    }
}
