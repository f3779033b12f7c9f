//! Error types for redocx library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for redocx operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while rebuilding documents.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A results JSON could not be decoded or encoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An artifact the operation depends on does not exist.
    #[error("Missing artifact: {}", .0.display())]
    MissingArtifact(PathBuf),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// The OCR provider failed for a page.
    #[error("OCR provider error: {0}")]
    Ocr(String),

    /// The text corrector failed for a page.
    #[error("Text correction error: {0}")]
    Correction(String),

    /// The text corrector returned a batch of the wrong size.
    #[error("Correction batch returned {actual} results for {expected} inputs")]
    BatchLength {
        /// Number of texts sent
        expected: usize,
        /// Number of texts received
        actual: usize,
    },

    /// A provider could not be started.
    #[error("Provider initialization failed: {0}")]
    ProviderInit(String),

    /// An extracted region image referenced by the layout is missing.
    #[error("Image not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    /// An extracted region image could not be decoded.
    #[error("Image decoding error: {0}")]
    Image(String),

    /// Error while writing the output document.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error happens before any page work and must stop a batch.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::ProviderInit(_))
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => Error::Io(e),
            _ => Error::Image(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::BatchLength {
            expected: 3,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "Correction batch returned 2 results for 3 inputs"
        );

        let err = Error::MissingArtifact(PathBuf::from("output/7/7_res.json"));
        assert_eq!(err.to_string(), "Missing artifact: output/7/7_res.json");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_only_init_errors_are_fatal() {
        assert!(Error::ProviderInit("no such program".into()).is_fatal());
        assert!(!Error::Ocr("timeout".into()).is_fatal());
        assert!(!Error::Render("zip".into()).is_fatal());
    }
}
