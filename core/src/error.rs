use thiserror::Error;

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Error types for generator operations
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// A requested modality code is not present in the statistics bundle
    #[error(
        "Modality '{requested}' was not supported, supported modalities are: {}",
        supported.join(",")
    )]
    UnsupportedModality {
        requested: String,
        supported: Vec<String>,
    },

    /// Invalid configuration or degenerate distribution
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The statistics bundle could not be loaded
    #[error("Statistics error: {0}")]
    Statistics(String),

    /// DICOM encoding error
    #[error("DICOM error: {0}")]
    DicomError(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GeneratorError {
    /// Shorthand for a [`GeneratorError::Configuration`]
    pub fn config(msg: impl Into<String>) -> Self {
        GeneratorError::Configuration(msg.into())
    }
}

// Helper conversions
impl From<String> for GeneratorError {
    fn from(s: String) -> Self {
        GeneratorError::Configuration(s)
    }
}

impl From<&str> for GeneratorError {
    fn from(s: &str) -> Self {
        GeneratorError::Configuration(s.to_string())
    }
}

impl From<rand_distr::NormalError> for GeneratorError {
    fn from(e: rand_distr::NormalError) -> Self {
        GeneratorError::Configuration(format!("invalid normal distribution: {}", e))
    }
}
