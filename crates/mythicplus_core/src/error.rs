use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("client is not configured: {0}")]
    NotConfigured(String),

    #[error("failed to refresh bearer token: {0}")]
    CredentialRefresh(String),

    #[error("{provider} returned unexpected status {status}")]
    Provider { provider: &'static str, status: u16 },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("failed to send notification: {0}")]
    Notify(String),

    #[error("failed to list characters: {0}")]
    ListCharacters(Box<Error>),

    #[error("character {0} is already tracked")]
    AlreadyTracked(String),

    #[error("character {0} is not tracked")]
    NotTracked(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}
