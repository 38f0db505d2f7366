use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid outgoing message: {0}")]
    InvalidMessage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Stable error-kind tag for log payloads and result strings.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::Config(_) => "config_error",
            CoreError::InvalidMessage(_) => "message_invalid",
            CoreError::Serialization(_) => "serialization_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
