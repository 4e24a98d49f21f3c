use thiserror::Error;

/// Failure carried by a stream's error channel.
///
/// Cloned to every subscriber that observes it.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StreamError {
    message: String,
}

impl StreamError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Faults that stop a component subtree from rendering.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("stream failed: {0}")]
    Stream(#[from] StreamError),
    #[error("could not resolve source: {0}")]
    Source(String),
    #[error("replay payload rejected: {0}")]
    Replay(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
