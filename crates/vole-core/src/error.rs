/// All errors that can occur within Vole.
///
/// This enum captures every failure mode: bad configuration, image decode
/// failures, shape mismatches between data and model, and out-of-bounds
/// dataset indexing. Using a single error type across the workspace
/// simplifies error propagation.
///
/// None of these are recovered internally: a failure aborts the current run
/// and carries enough context (path, line, index) to diagnose it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad paths, missing files, malformed label files, invalid settings.
    #[error("configuration error: {0}")]
    Config(String),

    /// An image file was missing, unreadable, or not a decodable format.
    #[error("failed to decode image {path}: {reason}")]
    Decode { path: String, reason: String },

    /// A tensor's shape is inconsistent with what the consumer expects
    /// (e.g. a transform's output does not match the model's input size).
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// Dataset index outside `[0, len)`.
    #[error("index {index} out of range for dataset of length {len}")]
    OutOfRange { index: usize, len: usize },

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic message for cases not covered above.
    #[error("{0}")]
    Msg(String),
}

impl Error {
    /// Create an error from any string message.
    pub fn msg(s: impl Into<String>) -> Self {
        Error::Msg(s.into())
    }

    /// Create a configuration error from any string message.
    pub fn config(s: impl Into<String>) -> Self {
        Error::Config(s.into())
    }
}

/// Convenience Result type used throughout Vole.
pub type Result<T> = std::result::Result<T, Error>;

/// Macro for early return with a formatted error message.
/// Usage: `bail!("something went wrong: {}", detail)`
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::Msg(format!($($arg)*)))
    };
}
