#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid food code: {0}. The code must be a valid number")]
    InvalidCode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read {path}: {reason}")]
    ReadFile { path: String, reason: String },
}
