use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// WhatsApp interactive/text limits, enforced before anything is handed to
/// the outbound sender.
pub const MAX_TEXT_BODY: usize = 4096;
pub const MAX_BUTTONS: usize = 3;
pub const MAX_BUTTON_TITLE: usize = 20;
pub const MAX_LIST_SECTIONS: usize = 10;
pub const MAX_ROWS_PER_SECTION: usize = 10;

/// A message bound for the user, in one of the shapes the outbound sender
/// knows how to serialise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutgoingMessage {
    Text {
        body: String,
    },
    /// Interactive reply-button message: up to three tappable buttons.
    Buttons {
        body: String,
        buttons: Vec<Button>,
    },
    /// Interactive list message: sections of selectable rows behind one
    /// list-open button.
    List {
        body: String,
        button: String,
        sections: Vec<ListSection>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Button {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListSection {
    pub title: String,
    pub rows: Vec<ListRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRow {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl OutgoingMessage {
    pub fn text(body: impl Into<String>) -> Self {
        OutgoingMessage::Text { body: body.into() }
    }

    /// The message body, whichever variant this is.
    pub fn body(&self) -> &str {
        match self {
            OutgoingMessage::Text { body } => body,
            OutgoingMessage::Buttons { body, .. } => body,
            OutgoingMessage::List { body, .. } => body,
        }
    }

    /// Enforce the WhatsApp shape limits. Limits are counted in characters,
    /// matching what the provider rejects.
    pub fn validate(&self) -> Result<()> {
        let body = self.body();
        if body.chars().count() > MAX_TEXT_BODY {
            return Err(CoreError::InvalidMessage(format!(
                "body exceeds {} chars",
                MAX_TEXT_BODY
            )));
        }
        match self {
            OutgoingMessage::Text { .. } => Ok(()),
            OutgoingMessage::Buttons { buttons, .. } => {
                if buttons.is_empty() || buttons.len() > MAX_BUTTONS {
                    return Err(CoreError::InvalidMessage(format!(
                        "button count must be 1..={}, got {}",
                        MAX_BUTTONS,
                        buttons.len()
                    )));
                }
                for b in buttons {
                    if b.title.chars().count() > MAX_BUTTON_TITLE {
                        return Err(CoreError::InvalidMessage(format!(
                            "button title '{}' exceeds {} chars",
                            b.title, MAX_BUTTON_TITLE
                        )));
                    }
                }
                Ok(())
            }
            OutgoingMessage::List { sections, .. } => {
                if sections.is_empty() || sections.len() > MAX_LIST_SECTIONS {
                    return Err(CoreError::InvalidMessage(format!(
                        "section count must be 1..={}, got {}",
                        MAX_LIST_SECTIONS,
                        sections.len()
                    )));
                }
                for s in sections {
                    if s.rows.is_empty() || s.rows.len() > MAX_ROWS_PER_SECTION {
                        return Err(CoreError::InvalidMessage(format!(
                            "section '{}' row count must be 1..={}, got {}",
                            s.title,
                            MAX_ROWS_PER_SECTION,
                            s.rows.len()
                        )));
                    }
                }
                Ok(())
            }
        }
    }
}

/// The stored inbound message record handed over by the webhook layer.
///
/// The turn builder projects this into a [`crate::Turn`]; nothing else in
/// the core reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub tenant_id: String,
    pub wa_id: String,
    pub message_id: String,
    pub kind: MessageKind,
    /// RFC3339 UTC timestamp.
    pub timestamp: String,
}

/// Provider message types the turn builder knows how to distil into text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageKind {
    Text {
        body: String,
    },
    /// A tapped button or list row. `label` is the visible title, `payload`
    /// the opaque element id.
    Interactive {
        label: String,
        payload: Option<String>,
    },
    Audio {
        transcription: Option<String>,
    },
    Image,
    Video,
    Document,
    Location,
    Contacts,
    Sticker,
    /// A provider type this build does not know; carries the raw type tag.
    Unknown {
        tag: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_at_limit_is_valid() {
        let msg = OutgoingMessage::text("x".repeat(MAX_TEXT_BODY));
        assert!(msg.validate().is_ok());
    }

    #[test]
    fn text_over_limit_is_rejected() {
        let msg = OutgoingMessage::text("x".repeat(MAX_TEXT_BODY + 1));
        assert!(msg.validate().is_err());
    }

    #[test]
    fn four_buttons_are_rejected() {
        let buttons = (0..4)
            .map(|i| Button {
                id: format!("b{}", i),
                title: "Ok".to_string(),
            })
            .collect();
        let msg = OutgoingMessage::Buttons {
            body: "pick one".to_string(),
            buttons,
        };
        assert!(msg.validate().is_err());
    }

    #[test]
    fn long_button_title_is_rejected() {
        let msg = OutgoingMessage::Buttons {
            body: "pick".to_string(),
            buttons: vec![Button {
                id: "b1".to_string(),
                title: "x".repeat(MAX_BUTTON_TITLE + 1),
            }],
        };
        assert!(msg.validate().is_err());
    }

    #[test]
    fn list_within_limits_is_valid() {
        let msg = OutgoingMessage::List {
            body: "menu".to_string(),
            button: "View".to_string(),
            sections: vec![ListSection {
                title: "Drinks".to_string(),
                rows: vec![ListRow {
                    id: "r1".to_string(),
                    title: "Coffee".to_string(),
                    description: None,
                }],
            }],
        };
        assert!(msg.validate().is_ok());
    }

    #[test]
    fn eleven_sections_are_rejected() {
        let sections = (0..11)
            .map(|i| ListSection {
                title: format!("s{}", i),
                rows: vec![ListRow {
                    id: "r".to_string(),
                    title: "t".to_string(),
                    description: None,
                }],
            })
            .collect();
        let msg = OutgoingMessage::List {
            body: "menu".to_string(),
            button: "View".to_string(),
            sections,
        };
        assert!(msg.validate().is_err());
    }

    #[test]
    fn limits_count_chars_not_bytes() {
        // 20 multi-byte chars fit exactly in a button title.
        let msg = OutgoingMessage::Buttons {
            body: "pick".to_string(),
            buttons: vec![Button {
                id: "b1".to_string(),
                title: "ñ".repeat(MAX_BUTTON_TITLE),
            }],
        };
        assert!(msg.validate().is_ok());
    }
}
