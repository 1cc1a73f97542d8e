use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dataframe error: {0}")]
    Frame(#[from] polars::prelude::PolarsError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("Invalid artifact reference: {0}")]
    InvalidReference(String),

    #[error("Data check '{check}' failed: {message}")]
    CheckFailed { check: String, message: String },

    #[error("Model error: {0}")]
    Model(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
