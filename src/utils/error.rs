use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned status {status} for {url}")]
    ApiStatusError { status: u16, url: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data source unavailable: {message}")]
    SourceUnavailable { message: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    #[error("Unknown route: {path}")]
    RouteError { path: String },

    #[error("Invalid state transition: {message}")]
    StateError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    Storage,
    Navigation,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ConsoleError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ConsoleError::ApiError(_)
            | ConsoleError::ApiStatusError { .. }
            | ConsoleError::SourceUnavailable { .. } => ErrorCategory::Network,
            ConsoleError::CsvError(_)
            | ConsoleError::SerializationError(_)
            | ConsoleError::NotFound { .. }
            | ConsoleError::ValidationError { .. } => ErrorCategory::Data,
            ConsoleError::ConfigError { .. }
            | ConsoleError::ConfigValidationError { .. }
            | ConsoleError::InvalidConfigValueError { .. }
            | ConsoleError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ConsoleError::IoError(_) => ErrorCategory::Storage,
            ConsoleError::RouteError { .. } => ErrorCategory::Navigation,
            ConsoleError::StateError { .. } => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 網路錯誤可重試
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Navigation => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::Storage => ErrorSeverity::High,
            ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    /// 是否可以透過「重試」恢復
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Network
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check that the backend is reachable and try again",
            ErrorCategory::Data => "Check the identifiers and the response format of the backend",
            ErrorCategory::Configuration => "Fix the configuration file or command line flags",
            ErrorCategory::Storage => "Check that the output directory exists and is writable",
            ErrorCategory::Navigation => "Use /clients or /clients/{id}/settings",
            ErrorCategory::Internal => "This is a bug, please report it",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ConsoleError::ApiError(_)
            | ConsoleError::ApiStatusError { .. }
            | ConsoleError::SourceUnavailable { .. } => "Unable to reach the data source".to_string(),
            ConsoleError::NotFound { kind, id } => format!("{} '{}' does not exist", kind, id),
            ConsoleError::RouteError { path } => format!("There is no page at '{}'", path),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_errors_are_retryable() {
        let err = ConsoleError::SourceUnavailable {
            message: "boom".to_string(),
        };
        assert!(err.is_retryable());
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert_eq!(err.user_friendly_message(), "Unable to reach the data source");
    }

    #[test]
    fn test_config_errors_are_not_retryable() {
        let err = ConsoleError::MissingConfigError {
            field: "source.endpoint".to_string(),
        };
        assert!(!err.is_retryable());
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }
}
