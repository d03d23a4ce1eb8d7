use thiserror::Error;

/// Failure of the invocation itself, before any envelope came back.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("{0}")]
    Invoke(String),
    #[error("push channel unavailable: {0}")]
    Subscribe(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Backend(String),
    #[error("{0}")]
    Transport(String),
    #[error("cancelled by user")]
    UserAbort,
}

impl ClientError {
    /// Text for the error banner. `None` for errors that stay silent.
    pub fn banner(&self) -> Option<String> {
        match self {
            ClientError::UserAbort => None,
            other => Some(other.to_string()),
        }
    }
}
