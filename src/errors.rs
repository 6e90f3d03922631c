use thiserror::Error;

/// Error taxonomy for backend calls.
///
/// `Transport` and `Decode` cover the network call itself; `Api` carries a
/// logical failure reported inside a well-formed envelope (the HTTP call
/// succeeded, the backend did not). All variants are `Clone` so a single
/// settled result can be handed to every caller attached to the same
/// in-flight load.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("{message}")]
    Api {
        code: Option<String>,
        message: String,
    },

    #[error("validation error: {0}")]
    Validation(String),
}

impl ClientError {
    pub fn api(code: Option<String>, message: impl Into<String>) -> Self {
        ClientError::Api {
            code,
            message: message.into(),
        }
    }

    /// True for failures of the call itself, as opposed to logical
    /// failures reported by the backend.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(err: validator::ValidationErrors) -> Self {
        ClientError::Validation(err.to_string())
    }
}
