//! Error types for the report library.
//!
//! Every rejected call and every rendering failure surfaces as one of these
//! variants; nothing is signalled through sentinel return values.

use crate::writer::ImageError;

/// Result type alias for report library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building a report.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required argument was missing or empty
    #[error("{0}")]
    MissingArgument(&'static str),

    /// An argument was present but unusable
    #[error("Invalid {what}: {reason}")]
    InvalidArgument {
        /// Name of the offending argument
        what: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// Chart labels and values differ in length
    #[error(
        "The number of labels must match the number of values entered ({labels} labels, {values} values)"
    )]
    LengthMismatch {
        /// Number of labels supplied
        labels: usize,
        /// Number of values supplied
        values: usize,
    },

    /// Unknown font family or style
    #[error("Font error: {0}")]
    Font(String),

    /// A drawing call was made before any page was opened
    #[error("No page open, add a page first")]
    NoPage,

    /// Image loading or embedding failed
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidArgument`].
    pub(crate) fn invalid(what: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            what,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_argument_message() {
        let err = Error::MissingArgument("A title must be specified");
        assert_eq!(err.to_string(), "A title must be specified");
    }

    #[test]
    fn test_length_mismatch_message() {
        let err = Error::LengthMismatch {
            labels: 3,
            values: 4,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("number of labels must match"));
        assert!(msg.contains("3 labels"));
        assert!(msg.contains("4 values"));
    }

    #[test]
    fn test_invalid_argument_message() {
        let err = Error::invalid("dpi", "must be positive");
        assert_eq!(err.to_string(), "Invalid dpi: must be positive");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.png");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("missing.png"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
