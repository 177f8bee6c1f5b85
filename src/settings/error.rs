use thiserror::Error;

/// Layout file errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("layout file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("layout file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid layout: {0}")]
    Invalid(String),
}
