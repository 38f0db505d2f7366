//! The compact, PII-light state summary sent to the routing LLM.

use chrono::{FixedOffset, Utc};
use serde_json::Value;

use tendero_core::telemetry::digest;
use tendero_session::{contract, DialogueEntry, Session};

/// Bogotá is UTC-5 year-round.
const BOGOTA_UTC_OFFSET_HOURS: i32 = -5;

/// Summarise the session for the router prompt: lane, cart shape, the last
/// three entries with truncated text, and temporal hints. Nothing else —
/// the summary deliberately omits ids, names and full history.
pub fn state_summary(session: &Session, max_text: usize) -> String {
    let lane = session
        .str_field(contract::CURRENT_LANE)
        .unwrap_or("info")
        .to_string();
    let cart_count = session
        .get(contract::CART_ITEMS)
        .and_then(Value::as_array)
        .map(Vec::len)
        .unwrap_or(0);

    let mut lines = vec![
        format!("current_lane: {}", lane),
        format!("has_cart: {}", cart_count > 0),
        format!("cart_items: {}", cart_count),
    ];

    let recent = session.recent_turns(3);
    if !recent.is_empty() {
        lines.push("recent:".to_string());
        for entry in recent {
            match entry {
                DialogueEntry::User { text, .. } => {
                    lines.push(format!("  user: {}", digest(&text, max_text)));
                }
                DialogueEntry::Assistant { lane, messages, .. } => {
                    let text = messages
                        .first()
                        .map(|m| digest(m.body(), max_text))
                        .unwrap_or_default();
                    lines.push(format!("  assistant[{}]: {}", lane, text));
                }
            }
        }
    }

    let local = Utc::now().with_timezone(
        &FixedOffset::east_opt(BOGOTA_UTC_OFFSET_HOURS * 3600)
            .expect("fixed offset in range"),
    );
    let hour = chrono::Timelike::hour(&local);
    lines.push(format!("day_of_week: {}", local.format("%A")));
    lines.push(format!("business_hours_open: {}", (8..20).contains(&hour)));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tendero_session::builder;

    #[test]
    fn summary_reports_lane_and_cart_shape() {
        let mut session = builder::new_session("t1", "57300111", None, None);
        session.set(
            contract::CART_ITEMS,
            serde_json::json!([{"sku": "CAFE-250", "qty": 1}]),
        );
        let summary = state_summary(&session, 200);
        assert!(summary.contains("current_lane: info"));
        assert!(summary.contains("has_cart: true"));
        assert!(summary.contains("cart_items: 1"));
        assert!(summary.contains("day_of_week:"));
    }

    #[test]
    fn summary_truncates_and_limits_recent_entries() {
        let mut session = builder::new_session("t1", "57300111", None, None);
        for i in 0..5 {
            session
                .push_user_entry(&"x".repeat(500), &format!("m{}", i), "2025-01-15T10:00:00Z")
                .unwrap();
        }
        let summary = state_summary(&session, 50);
        // Only the last three entries appear, each truncated.
        assert_eq!(summary.matches("  user:").count(), 3);
        assert!(!summary.contains(&"x".repeat(60)));
    }

    #[test]
    fn summary_contains_no_identity_fields() {
        let session = builder::new_session("t1", "573001234567", None, None);
        let summary = state_summary(&session, 200);
        assert!(!summary.contains("573001234567"));
        assert!(!summary.contains("t1"));
    }
}
