//! Tracing setup and log-payload helpers.
//!
//! Every public action in the core emits exactly one structured event with a
//! stable `event` field; the subscriber configured here renders them as
//! single-line JSON.

/// Initialise the global subscriber: env-filtered, single-line JSON.
///
/// Call once from the embedding binary. Safe default filter keeps the core
/// at `info` and everything else quiet.
pub fn init() {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tendero=info".into()),
        )
        .init();
}

/// Truncate user text for log payloads and router summaries.
///
/// Char-boundary safe; appends an ellipsis marker when anything was cut.
pub fn digest(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}…", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_passes_through() {
        assert_eq!(digest("hola", 200), "hola");
    }

    #[test]
    fn long_text_is_cut_with_marker() {
        let d = digest(&"a".repeat(300), 200);
        assert_eq!(d.chars().count(), 201);
        assert!(d.ends_with('…'));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let d = digest(&"ñ".repeat(10), 5);
        assert_eq!(d, format!("{}…", "ñ".repeat(5)));
    }
}
