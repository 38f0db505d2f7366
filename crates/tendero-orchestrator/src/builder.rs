//! Projects a stored inbound message record into the canonical [`Turn`].

use tendero_core::{MessageKind, MessageRecord, Turn};

/// Distil the provider message into turn text and payload.
///
/// Text messages pass their body through; interactive taps carry the
/// visible label as text and the element id as payload; media without a
/// transcription becomes a typed placeholder so the dialogue history
/// still shows that *something* arrived.
pub fn build_turn(record: &MessageRecord) -> Turn {
    let (text, payload) = match &record.kind {
        MessageKind::Text { body } => (body.clone(), None),
        MessageKind::Interactive { label, payload } => (label.clone(), payload.clone()),
        MessageKind::Audio {
            transcription: Some(transcription),
        } => (transcription.clone(), None),
        MessageKind::Audio {
            transcription: None,
        } => ("[Audio message]".to_string(), None),
        MessageKind::Image => ("[Image message]".to_string(), None),
        MessageKind::Video => ("[Video message]".to_string(), None),
        MessageKind::Document => ("[Document message]".to_string(), None),
        MessageKind::Location => ("[Location message]".to_string(), None),
        MessageKind::Contacts => ("[Contact message]".to_string(), None),
        MessageKind::Sticker => ("[Sticker message]".to_string(), None),
        MessageKind::Unknown { tag } => (format!("[{} message]", tag), None),
    };

    Turn {
        tenant_id: record.tenant_id.clone(),
        wa_id: record.wa_id.clone(),
        message_id: record.message_id.clone(),
        text,
        payload,
        timestamp: record.timestamp.clone(),
    }
}
