//! Error types shared across the service.
//!
//! `FetchError` and `NotifyError` are tick-local: the scheduler logs them and
//! moves on. `ConfigError` is only produced at startup and is fatal.

use thiserror::Error;

/// Failure to obtain an exchange rate from the provider.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Rate provider returned HTTP {status}")]
    Status { status: u16 },

    #[error("Malformed rate response: {message}")]
    Malformed { message: String },
}

/// Failure to compose or deliver a drop notification.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Failed to build message: {message}")]
    Message { message: String },

    #[error("Mail transport error: {message}")]
    Transport { message: String },
}

/// Missing or invalid startup configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} is required")]
    Missing { key: &'static str },

    #[error("Invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Unified application error, as seen by `main`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Notify(#[from] NotifyError),
}

impl FetchError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed { message: message.into() }
    }
}

impl NotifyError {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message { message: message.into() }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into() }
    }
}

impl ConfigError {
    pub fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid { key, message: message.into() }
    }
}
