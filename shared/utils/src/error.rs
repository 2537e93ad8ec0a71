use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum TenderError {
    #[error("Input error: {message}")]
    Input { message: String },

    #[error("Failed to parse input file: {message}")]
    Parse { message: String },

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Error creating {template} template: {message}")]
    Generation { template: String, message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Access denied: {message}")]
    AccessDenied { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl TenderError {
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn generation(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Generation {
            template: template.into(),
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Input { .. } => "INPUT_ERROR",
            Self::Parse { .. } => "PARSE_ERROR",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Generation { .. } => "GENERATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::AccessDenied { .. } => "ACCESS_DENIED",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Internal { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Input { .. } => 400,
            Self::Parse { .. } => 422,
            Self::Validation { .. } => 400,
            Self::Generation { .. } => 500,
            Self::NotFound { .. } => 404,
            Self::AccessDenied { .. } => 403,
            Self::Configuration { .. } => 500,
            Self::Internal { .. } => 500,
        }
    }

    /// Short text for the caller. Validation messages already name the work
    /// and bidder, so they go out without the field prefix.
    pub fn user_message(&self) -> String {
        match self {
            Self::Input { message } | Self::Validation { message, .. } => message.clone(),
            Self::Parse { .. } | Self::Generation { .. } => self.to_string(),
            Self::NotFound { .. } => "File not found".to_string(),
            Self::AccessDenied { .. } => "Access denied".to_string(),
            Self::Configuration { .. } | Self::Internal { .. } => "Internal server error".to_string(),
        }
    }
}

pub type TenderResult<T> = Result<T, TenderError>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl From<TenderError> for ErrorResponse {
    fn from(error: TenderError) -> Self {
        Self {
            error: error.user_message(),
            code: error.error_code().to_string(),
            message: error.to_string(),
            details: None,
        }
    }
}

impl From<std::io::Error> for TenderError {
    fn from(error: std::io::Error) -> Self {
        Self::internal(error.to_string())
    }
}

impl From<serde_json::Error> for TenderError {
    fn from(error: serde_json::Error) -> Self {
        Self::validation("JSON", error.to_string())
    }
}

impl From<calamine::Error> for TenderError {
    fn from(error: calamine::Error) -> Self {
        Self::input(format!("Failed to read Excel file: {}", error))
    }
}
