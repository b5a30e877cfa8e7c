//! Application-wide error types.

use thiserror::Error;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Application-wide error type.
///
/// Only [`Error::Configuration`] is fatal. Every other variant is reported to
/// the chat by the poller and the loop carries on.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Request to the homework API failed: {0}")]
    Transport(String),

    #[error("Homework API returned status {status}")]
    HttpStatus { status: u16 },

    #[error("Unexpected homework API response: {0}")]
    Shape(String),

    #[error("Homework record violates the API contract: {0}")]
    ApiContract(String),

    #[error("Notification delivery failed: {0}")]
    Notification(String),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn shape(msg: impl Into<String>) -> Self {
        Self::Shape(msg.into())
    }

    pub fn contract(msg: impl Into<String>) -> Self {
        Self::ApiContract(msg.into())
    }

    pub fn notification(msg: impl Into<String>) -> Self {
        Self::Notification(msg.into())
    }
}
