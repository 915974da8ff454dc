//! Error types and handling for the `TravelPlanner` service

use thiserror::Error;

/// Main error type for the `TravelPlanner` service
#[derive(Error, Debug)]
pub enum TravelPlannerError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Upstream API communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Upstream payloads that could not be decoded
    #[error("Parse error: {message}")]
    Parse { message: String },
}

impl TravelPlannerError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TravelPlannerError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            TravelPlannerError::Api { .. } => {
                "Unable to reach the travel services. Please try again later.".to_string()
            }
            TravelPlannerError::Validation { message } => message.clone(),
            TravelPlannerError::Parse { .. } => {
                "Received an unexpected answer from the travel services.".to_string()
            }
        }
    }
}
