use thiserror::Error;

#[derive(Debug, Error)]
pub enum PillCheckError {
    #[error("Graph bounds not initialized. Load the graph bounds first.")]
    UninitializedBounds,

    #[error("Position x={x} is outside the graph (width {width})")]
    OutOfBounds { x: f64, width: f64 },

    #[error("No pill detected")]
    NoDetection,

    #[error("Time format error: {0}")]
    Format(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("WebDriver error: {0}")]
    Driver(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
}

pub type PillCheckResult<T> = Result<T, PillCheckError>;
