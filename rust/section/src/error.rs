use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to the caller before or during a cut.
///
/// Per-face geometry faults are not errors; they degrade the drawing and
/// are logged at debug level instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid cut plane: {0}")]
    InvalidPlane(String),

    #[error("Kernel error: {0}")]
    Kernel(#[from] plancut_kernel::Error),
}
