use thiserror::Error;

#[derive(Debug, Error)]
pub enum RiskAtlasError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),
    #[error("Simulation cancelled")]
    Cancelled,
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Optimization failed: {0}")]
    Optimization(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RiskAtlasError>;

impl From<RiskAtlasError> for String {
    fn from(e: RiskAtlasError) -> Self {
        e.to_string()
    }
}

impl From<serde_json::Error> for RiskAtlasError {
    fn from(e: serde_json::Error) -> Self {
        RiskAtlasError::Config(e.to_string())
    }
}

impl From<argmin::core::Error> for RiskAtlasError {
    fn from(e: argmin::core::Error) -> Self {
        RiskAtlasError::Optimization(e.to_string())
    }
}

impl From<rayon::ThreadPoolBuildError> for RiskAtlasError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        RiskAtlasError::ThreadPool(e.to_string())
    }
}

/// Fails with `InvalidParameter` unless `value` is finite and strictly positive.
pub fn ensure_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(RiskAtlasError::InvalidParameter(format!(
            "{name} must be positive, got {value}"
        )))
    }
}

/// Fails with `InvalidParameter` unless `value` is finite and `>= 0`.
pub fn ensure_non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(RiskAtlasError::InvalidParameter(format!(
            "{name} must be non-negative, got {value}"
        )))
    }
}

pub fn ensure_finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(RiskAtlasError::InvalidParameter(format!(
            "{name} must be finite, got {value}"
        )))
    }
}

pub fn ensure_count(name: &str, value: usize) -> Result<()> {
    if value >= 1 {
        Ok(())
    } else {
        Err(RiskAtlasError::InvalidParameter(format!(
            "{name} must be at least 1"
        )))
    }
}

/// Confidence levels live in the open interval `(0, 1)`.
pub fn ensure_confidence(confidence: f64) -> Result<()> {
    if confidence > 0.0 && confidence < 1.0 {
        Ok(())
    } else {
        Err(RiskAtlasError::InvalidParameter(format!(
            "confidence must be in (0, 1), got {confidence}"
        )))
    }
}
