use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgriSenseError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("Vector store error: {0}")]
    VectorStoreError(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AgriSenseError {
    /// True for failures caused by the caller's request rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Message shown to API and CLI callers
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput(message) => message.clone(),
            Self::LlmError(detail) => format!("Error generating response: {detail}"),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AgriSenseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_variants_display() {
        let errors = vec![
            AgriSenseError::ConfigError("config".to_string()),
            AgriSenseError::InvalidInput("input".to_string()),
            AgriSenseError::HttpError("http".to_string()),
            AgriSenseError::EmbeddingError("embedding".to_string()),
            AgriSenseError::VectorStoreError("store".to_string()),
            AgriSenseError::LlmError("llm".to_string()),
        ];

        for error in &errors {
            let display = format!("{error}");
            assert!(!display.is_empty());
        }
    }

    #[test]
    fn test_dimension_mismatch_message() {
        let error = AgriSenseError::DimensionMismatch {
            expected: 384,
            actual: 3,
        };
        let display = error.to_string();
        assert!(display.contains("384"));
        assert!(display.contains('3'));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AgriSenseError = io_err.into();
        assert!(matches!(err, AgriSenseError::Io(_)));
    }

    #[test]
    fn test_client_error_classification() {
        assert!(AgriSenseError::InvalidInput("x".into()).is_client_error());
        assert!(!AgriSenseError::LlmError("x".into()).is_client_error());
    }

    #[test]
    fn test_user_message() {
        assert_eq!(
            AgriSenseError::InvalidInput("No question provided".into()).user_message(),
            "No question provided"
        );
        assert_eq!(
            AgriSenseError::LlmError("timeout".into()).user_message(),
            "Error generating response: timeout"
        );
    }
}
