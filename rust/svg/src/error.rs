use thiserror::Error;

/// Result type for rendering operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported before or while assembling a document
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid render configuration: {0}")]
    InvalidConfig(String),

    #[error("Section pipeline error: {0}")]
    Section(#[from] plancut_section::Error),
}
