/// Core error types for the Retromode engine.
use std::path::PathBuf;

/// A specialized Result type for Retromode operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Top-level error type encompassing all Retromode subsystems.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A transform argument or other numeric input was non-finite or out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A custom matrix did not have the required 3x3 shape.
    #[error("dimension error: {0}")]
    Dimension(String),

    /// A required image, task or drawable was missing or empty.
    #[error("null input: {0}")]
    NullInput(String),

    /// A named lookup missed.
    #[error("not found: {0}")]
    NotFound(String),

    /// The call is never valid for this receiver, or was re-entered.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// An image file could not be decoded or encoded.
    #[error("asset error: {message} ({path:?})")]
    Asset { message: String, path: PathBuf },

    /// Reading or writing a file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The engine config was not valid TOML for its schema.
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    /// The engine config could not be serialized.
    #[error("config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}

impl EngineError {
    /// Create an invalid-parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        EngineError::InvalidParameter(message.into())
    }

    /// Create a dimension error.
    pub fn dimension(message: impl Into<String>) -> Self {
        EngineError::Dimension(message.into())
    }

    /// Create a null-input error.
    pub fn null_input(message: impl Into<String>) -> Self {
        EngineError::NullInput(message.into())
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        EngineError::NotFound(message.into())
    }

    /// Create an unsupported-operation error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        EngineError::UnsupportedOperation(message.into())
    }

    /// Create an asset error.
    pub fn asset(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        EngineError::Asset {
            message: message.into(),
            path: path.into(),
        }
    }
}

/// Fails with [`EngineError::InvalidParameter`] unless every value is finite.
pub fn ensure_finite(operation: &str, values: &[f64]) -> EngineResult<()> {
    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(EngineError::invalid_parameter(format!(
            "{operation}: non-finite value {bad}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = EngineError::not_found("task 'Controller'");
        assert_eq!(err.to_string(), "not found: task 'Controller'");
    }

    #[test]
    fn test_asset_error_display() {
        let err = EngineError::asset("file not found", "/assets/hero.png");
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_ensure_finite() {
        assert!(ensure_finite("translate", &[1.0, -2.5]).is_ok());
        let err = ensure_finite("translate", &[1.0, f64::NAN]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter(_)));
        assert!(ensure_finite("scale", &[f64::INFINITY]).is_err());
    }
}
