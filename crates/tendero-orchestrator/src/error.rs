use thiserror::Error;

/// Failures inside a turn that reach the controller's error path. Agent
/// and router failures never appear here — those layers degrade to
/// responses on their own.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("Store failure: {0}")]
    Store(#[from] tendero_store::StoreError),

    #[error("State invalid: {0}")]
    Session(#[from] tendero_session::SessionError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TurnError {
    /// Stable error-kind tag, matching the kinds reported in
    /// `TurnResult.error` strings.
    pub fn kind(&self) -> &'static str {
        match self {
            TurnError::Store(_) => "store_failure",
            TurnError::Session(e) => e.kind(),
            TurnError::Serialization(_) => "turn_unhandled",
        }
    }
}

pub type Result<T> = std::result::Result<T, TurnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        let store = TurnError::Store(tendero_store::StoreError::Unavailable("down".to_string()));
        assert_eq!(store.kind(), "store_failure");

        let session = TurnError::Session(tendero_session::SessionError::StateInvalid(
            "missing tenant_id".to_string(),
        ));
        assert_eq!(session.kind(), "state_invalid");
    }
}
