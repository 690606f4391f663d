use std::io;

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("not authorized")]
    Auth,
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("required field is missing: {field}")]
    Validation { field: &'static str },
    #[error("confirmation declined")]
    ConfirmationDeclined,
    #[error("unknown {kind} {id}")]
    UnknownRecord { kind: &'static str, id: i64 },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("session storage failure: {0}")]
    Storage(String),
}

impl ConsoleError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn missing_field(field: &'static str) -> Self {
        Self::Validation { field }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth)
    }
}

impl From<reqwest::Error> for ConsoleError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<io::Error> for ConsoleError {
    fn from(err: io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
