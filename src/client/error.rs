use std::fmt;

/// Failure talking to the controller service.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    /// Controller unreachable (connect failure, timeout)
    Transport(String),
    /// Agent or scan no longer exists (HTTP 404)
    NotFound(String),
    /// Controller answered with another non-success status
    Server { status: u16, message: String },
    /// Response body could not be decoded
    Decode(String),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }

    /// True when the controller or agent could not be reached at all,
    /// including the controller's own "Unable to reach" gateway errors.
    pub fn is_unreachable(&self) -> bool {
        match self {
            ClientError::Transport(_) => true,
            ClientError::Server { status, message } => {
                *status == 502 || *status == 504 || message.contains("Unable to reach")
            }
            _ => false,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(msg) => write!(f, "controller unreachable: {}", msg),
            ClientError::NotFound(msg) => write!(f, "not found: {}", msg),
            ClientError::Server { status, message } => {
                write!(f, "controller returned {}: {}", status, message)
            }
            ClientError::Decode(msg) => write!(f, "invalid controller response: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}
