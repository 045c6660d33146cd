use std::error::Error;

/// Base trait for all application errors
pub trait GantryError: Error + Send + Sync + 'static {
    /// Error code for programmatic handling
    fn error_code(&self) -> &'static str;

    /// Whether this error should be logged as an error or warning
    fn is_user_error(&self) -> bool {
        false
    }
}

/// Common result type for the application
pub type GantryResult<T> = Result<T, Box<dyn GantryError>>;

/// Derive a human-readable message from whatever error shape the backend
/// returns: a bare string, an object with a `message` field, or anything
/// else (generic fallback).
pub fn backend_error_message(raw: &serde_json::Value) -> String {
    if let Some(s) = raw.as_str() {
        return s.to_string();
    }
    if let Some(msg) = raw.get("message").and_then(|m| m.as_str()) {
        return msg.to_string();
    }
    "Backend command failed".to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse config file: {message}")]
    ConfigParseError { message: String },

    #[error("IO error reading config: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl GantryError for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            ConfigError::ConfigParseError { .. } => "CONFIG_PARSE_ERROR",
            ConfigError::IoError { .. } => "CONFIG_IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, ConfigError::ConfigParseError { .. })
    }
}
