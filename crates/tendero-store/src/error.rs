use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport-level failure talking to the backing store.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Stable error-kind tag for log payloads and result strings.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::Unavailable(_) => "store_failure",
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
