use thiserror::Error;

#[derive(Error, Debug)]
pub enum HealixError {
    #[error("Prediction request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid {field}: {message}")]
    ValidationError { field: String, message: String },

    #[error("Unknown form field: {name}")]
    UnknownFieldError { name: String },

    #[error("Unexpected prediction response: {message}")]
    UnexpectedResponseError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Io,
    Data,
    Configuration,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl HealixError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            HealixError::HttpError(_) => ErrorCategory::Network,
            HealixError::IoError(_) => ErrorCategory::Io,
            HealixError::SerializationError(_) | HealixError::UnexpectedResponseError { .. } => {
                ErrorCategory::Data
            }
            HealixError::ConfigError { .. } | HealixError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            HealixError::ValidationError { .. } | HealixError::UnknownFieldError { .. } => {
                ErrorCategory::Input
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Network | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    /// Short message suitable for a notification or terminal output.
    pub fn user_friendly_message(&self) -> String {
        match self {
            HealixError::HttpError(e) if e.is_connect() => {
                "Could not reach the prediction service".to_string()
            }
            HealixError::HttpError(_) => "The prediction request could not be completed".to_string(),
            HealixError::IoError(e) => format!("File access failed: {}", e),
            HealixError::SerializationError(_) => {
                "The prediction service returned malformed data".to_string()
            }
            HealixError::UnexpectedResponseError { message } => {
                format!("The prediction service returned an unexpected response: {}", message)
            }
            HealixError::ConfigError { message } => format!("Configuration problem: {}", message),
            HealixError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            HealixError::ValidationError { field, message } => format!("{}: {}", field, message),
            HealixError::UnknownFieldError { name } => format!("'{}' is not a form field", name),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check your network connection and the endpoint URL",
            ErrorCategory::Io => "Check that the file exists and is readable",
            ErrorCategory::Data => "Try again later or verify the endpoint is the prediction service",
            ErrorCategory::Configuration => "Review the configuration file and command line flags",
            ErrorCategory::Input => "Correct the highlighted field and submit again",
        }
    }
}

pub type Result<T> = std::result::Result<T, HealixError>;
