use thiserror::Error;

/// Result type for kernel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or combining solids
#[derive(Error, Debug)]
pub enum Error {
    #[error("Triangulation failed: {0}")]
    Triangulation(String),

    #[error("Degenerate face: {0}")]
    DegenerateFace(String),

    #[error("Boolean operation failed: {0}")]
    Boolean(String),

    #[error("Empty solid: {0}")]
    EmptySolid(String),
}
