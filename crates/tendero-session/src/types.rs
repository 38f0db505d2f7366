use serde::{Deserialize, Serialize};

use tendero_core::{Lane, OutgoingMessage};

/// One element of a session's `turns` array: either a user message snapshot
/// or an assistant response bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum DialogueEntry {
    User {
        text: String,
        message_id: String,
        /// RFC3339 UTC.
        timestamp: String,
    },
    Assistant {
        lane: Lane,
        messages: Vec<OutgoingMessage>,
        /// RFC3339 UTC.
        timestamp: String,
    },
}

impl DialogueEntry {
    pub fn is_user(&self) -> bool {
        matches!(self, DialogueEntry::User { .. })
    }

    pub fn lane(&self) -> Option<Lane> {
        match self {
            DialogueEntry::Assistant { lane, .. } => Some(*lane),
            DialogueEntry::User { .. } => None,
        }
    }

    /// The text of a user entry, `None` for assistant entries.
    pub fn user_text(&self) -> Option<&str> {
        match self {
            DialogueEntry::User { text, .. } => Some(text),
            DialogueEntry::Assistant { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_entry_serialises_with_role_tag() {
        let entry = DialogueEntry::User {
            text: "hola".to_string(),
            message_id: "m1".to_string(),
            timestamp: "2025-01-15T10:00:00Z".to_string(),
        };
        let v = serde_json::to_value(&entry).unwrap();
        assert_eq!(v["role"], "user");
        assert_eq!(v["message_id"], "m1");
    }

    #[test]
    fn assistant_entry_carries_lane_and_messages() {
        let entry = DialogueEntry::Assistant {
            lane: Lane::Commerce,
            messages: vec![OutgoingMessage::text("listo")],
            timestamp: "2025-01-15T10:00:01Z".to_string(),
        };
        let v = serde_json::to_value(&entry).unwrap();
        assert_eq!(v["role"], "assistant");
        assert_eq!(v["lane"], "commerce");
        assert_eq!(v["messages"][0]["type"], "text");
    }
}
