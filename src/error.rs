use thiserror::Error;

/// Main error type for the parsing engine
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("No capable parser: {0}")]
    NoCapableParser(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Parser `{parser}` failed: {message}")]
    Plugin { parser: &'static str, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ParseError>;

impl ParseError {
    /// Check whether the orchestrator may recover from this error by
    /// trying the next plugin or falling back to synthesis.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ParseError::Config(_))
    }

    /// Get the error code for structured responses
    pub fn error_code(&self) -> &'static str {
        match self {
            ParseError::EmptyInput(_) => "EMPTY_INPUT",
            ParseError::NoCapableParser(_) => "NO_CAPABLE_PARSER",
            ParseError::Validation(_) => "VALIDATION_ERROR",
            ParseError::Plugin { .. } => "PARSER_RUNTIME_ERROR",
            ParseError::Serialization(_) => "SERIALIZATION_ERROR",
            ParseError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Convert to a structured error payload
    pub fn to_error_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "recoverable": self.is_recoverable()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = ParseError::EmptyInput("no content".to_string());
        assert_eq!(err.error_code(), "EMPTY_INPUT");
        assert!(err.is_recoverable());

        let err = ParseError::Plugin {
            parser: "JsonPlugin",
            message: "bad brace".to_string(),
        };
        assert_eq!(err.error_code(), "PARSER_RUNTIME_ERROR");
        assert!(err.to_string().contains("JsonPlugin"));
    }

    #[test]
    fn test_error_payload() {
        let err = ParseError::Validation("segments empty".to_string());
        let payload = err.to_error_payload();
        assert_eq!(payload["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(payload["error"]["recoverable"], true);
    }
}
