use domain::DomainError;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Rejected locally, before any request was sent
    #[error("Validation error: {0}")]
    Validation(#[from] DomainError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server answered {status}: {message}")]
    RemoteFailure { status: StatusCode, message: String },

    #[error("Session error: {0}")]
    Session(String),

    /// A request body could not be turned into JSON
    #[error("Could not encode request: {0}")]
    Encoding(String),

    #[error("Not logged in")]
    NotAuthenticated,
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::RemoteFailure { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Session(err.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
