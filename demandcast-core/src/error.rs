//! Error types for the Demandcast core library.
//!
//! Uses `thiserror` for the public error type shared by the feature assembler,
//! the model runtime, and the web form gateway. A malformed exchange rate is
//! not an error: it degrades to a [`PriceNotice`](crate::features::PriceNotice).

/// Top-level error type for the Demandcast core library.
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Model artifact error: {0}")]
    Artifact(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl ForecastError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    pub fn artifact(msg: impl Into<String>) -> Self {
        Self::Artifact(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Whether the error was caused by what the user typed, as opposed to
    /// the model or the environment.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Convenience result alias for Demandcast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ForecastError::invalid_input("hour must be between 0 and 23");
        assert_eq!(err.to_string(), "Invalid input: hour must be between 0 and 23");

        let err = ForecastError::artifact("archive missing");
        assert_eq!(err.to_string(), "Model artifact error: archive missing");
    }

    #[test]
    fn test_user_error_classification() {
        assert!(ForecastError::invalid_input("x").is_user_error());
        assert!(!ForecastError::model("x").is_user_error());
        let io: ForecastError = std::io::Error::other("disk").into();
        assert!(!io.is_user_error());
    }
}
