//! Structured event log: one event with a stable tag per public action.
//!
//! Payloads never carry PII beyond `tenant_id`, `wa_id` and a truncated
//! digest of the user text.

use tracing::{info, warn};

use tendero_core::telemetry::digest;
use tendero_core::{Lane, RouterDecision, Turn};

const TEXT_DIGEST_CHARS: usize = 80;

pub fn session_created(tenant_id: &str, wa_id: &str) {
    info!(event = "session_created", tenant_id, wa_id, "session created");
}

pub fn duplicate_turn(turn: &Turn) {
    info!(
        event = "duplicate_turn",
        tenant_id = %turn.tenant_id,
        wa_id = %turn.wa_id,
        message_id = %turn.message_id,
        "message already processed"
    );
}

pub fn turn_routed(turn: &Turn, decision: &RouterDecision) {
    info!(
        event = "turn_routed",
        tenant_id = %turn.tenant_id,
        wa_id = %turn.wa_id,
        message_id = %turn.message_id,
        lane = %decision.lane,
        intent = %decision.intent,
        confidence = decision.confidence,
        text = %digest(&turn.text, TEXT_DIGEST_CHARS),
        "turn routed"
    );
}

pub fn baton_stop(turn: &Turn, lane: Lane, reason: &str) {
    info!(
        event = "baton_stop",
        tenant_id = %turn.tenant_id,
        wa_id = %turn.wa_id,
        lane = %lane,
        reason,
        "baton chain stopped"
    );
}

pub fn turn_completed(turn: &Turn, lane: Lane, message_count: usize) {
    info!(
        event = "turn_completed",
        tenant_id = %turn.tenant_id,
        wa_id = %turn.wa_id,
        message_id = %turn.message_id,
        lane = %lane,
        message_count,
        "turn completed"
    );
}

pub fn turn_error(turn: &Turn, error: &dyn std::fmt::Display) {
    warn!(
        event = "turn_error",
        tenant_id = %turn.tenant_id,
        wa_id = %turn.wa_id,
        message_id = %turn.message_id,
        err = %error,
        "turn failed"
    );
}

pub fn validation_error(turn: &Turn, reason: &dyn std::fmt::Display) {
    warn!(
        event = "validation_error",
        tenant_id = %turn.tenant_id,
        wa_id = %turn.wa_id,
        err = %reason,
        "session failed validation, resetting"
    );
}

pub fn lock_unavailable(turn: &Turn) {
    warn!(
        event = "lock_unavailable",
        tenant_id = %turn.tenant_id,
        wa_id = %turn.wa_id,
        message_id = %turn.message_id,
        "session lock busy"
    );
}
