//! Centralized error types for the Weathercards application.
//!
//! This module provides a typed error hierarchy that:
//! - Enables precise error handling throughout the codebase
//! - Provides user-friendly messages suitable for notices
//! - Preserves full error context for logging

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a notice-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Data(e) => e.user_message(),
            AppError::Input(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }

    /// Whether this error only reflects bad user input.
    ///
    /// Input errors are shown as lightweight notices and are not logged as errors.
    pub fn is_input(&self) -> bool {
        matches!(self, AppError::Input(_))
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The server is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
        }
    }
}

/// City/weather dataset errors.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("No weather reading for city: {0}")]
    MissingWeather(String),

    #[error("Invalid weather update: {0}")]
    InvalidUpdate(String),

    #[error("Failed to update city data: {0}")]
    UpdateFailed(String),

    #[error("Failed to delete city: {0}")]
    DeleteFailed(String),
}

impl DataError {
    pub fn user_message(&self) -> &'static str {
        match self {
            DataError::CityNotFound(_) => "City not found",
            DataError::MissingWeather(_) => "No weather data for this city.",
            DataError::InvalidUpdate(_) => "Invalid value. Check your input and try again.",
            DataError::UpdateFailed(_) => "Failed to update city data",
            DataError::DeleteFailed(_) => "Failed to delete city",
        }
    }
}

/// User input validation errors.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Empty search query")]
    EmptyQuery,

    #[error("No city matches '{0}'")]
    NoMatch(String),

    #[error("No city selected")]
    NoSelection,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl InputError {
    pub fn user_message(&self) -> &'static str {
        match self {
            InputError::EmptyQuery => "Please enter a city name",
            InputError::NoMatch(_) => "City not found",
            InputError::NoSelection => "Search for a city first",
            InputError::UnknownCommand(_) => "Unknown command. Type /help for a list.",
            InputError::InvalidArgument(_) => "Invalid argument. Type /help for usage.",
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_non_empty() {
        let errors = vec![
            AppError::from(NetworkError::Timeout),
            AppError::from(ConfigError::Invalid("test".into())),
            AppError::from(DataError::UpdateFailed("test".into())),
            AppError::from(InputError::EmptyQuery),
            AppError::from(std::io::Error::other("disk full")),
        ];

        for err in errors {
            assert!(!err.user_message().is_empty(), "{:?}", err);
        }
    }

    #[test]
    fn test_app_error_conversion() {
        let input_err = InputError::EmptyQuery;
        let app_err: AppError = input_err.into();
        assert!(matches!(app_err, AppError::Input(InputError::EmptyQuery)));
        assert!(app_err.is_input());
    }

    #[test]
    fn test_user_message_propagation() {
        let app_err = AppError::Input(InputError::NoMatch("Atlantis".into()));
        assert_eq!(app_err.user_message(), "City not found");

        let app_err = AppError::Data(DataError::DeleteFailed("500".into()));
        assert_eq!(app_err.user_message(), "Failed to delete city");
    }

    #[test]
    fn test_server_error_message_depends_on_status() {
        let server = NetworkError::ServerError {
            status: 503,
            message: "unavailable".into(),
        };
        let client = NetworkError::ServerError {
            status: 404,
            message: "missing".into(),
        };
        assert!(server.user_message().contains("later"));
        assert_eq!(client.user_message(), "The request failed. Please try again.");
    }
}
