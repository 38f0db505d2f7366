use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// Structural validation failed; the session cannot be trusted.
    #[error("State invalid: {0}")]
    StateInvalid(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SessionError {
    /// Stable error-kind tag for log payloads and result strings.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionError::StateInvalid(_) => "state_invalid",
            SessionError::Serialization(_) => "serialization_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
