//! The four key templates the core uses. These are a binding contract:
//! external tooling (dashboards, debugging scripts) relies on them.

/// Session JSON for one `(tenant_id, wa_id)` pair.
pub fn session(tenant_id: &str, wa_id: &str) -> String {
    format!("session:{}:{}", tenant_id, wa_id)
}

/// Per-session mutex guarding all mutation of the session.
pub fn session_lock(tenant_id: &str, wa_id: &str) -> String {
    format!("session:{}:{}:lock", tenant_id, wa_id)
}

/// Idempotency marker: set once a message id has been fully handled.
pub fn turn_processed(message_id: &str) -> String {
    format!("turn:processed:{}", message_id)
}

/// Ingress de-duplication marker: set when orchestration has been enqueued
/// for a provider message.
pub fn orchestrated(message_id: &str) -> String {
    format!("orchestrated:{}", message_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_match_contract() {
        assert_eq!(session("t1", "573001112233"), "session:t1:573001112233");
        assert_eq!(
            session_lock("t1", "573001112233"),
            "session:t1:573001112233:lock"
        );
        assert_eq!(turn_processed("wamid.X"), "turn:processed:wamid.X");
        assert_eq!(orchestrated("wamid.X"), "orchestrated:wamid.X");
    }
}
