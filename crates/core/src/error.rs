//! Error types for outline-to-deck generation.

use crate::outline::ParseError;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating a presentation.
///
/// Every variant is fatal for a run; nothing in the pipeline retries.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open, read or write a local file.
    #[error("Failed to access file: {0}")]
    IoError(#[from] std::io::Error),

    /// The HTTP request to the model server failed at the transport level.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The model server answered with a non-success status.
    #[error("Model server returned {status}: {body}")]
    ServerStatus { status: u16, body: String },

    /// A line of the streamed response was not a valid JSON fragment.
    #[error("Malformed response stream: {0}")]
    Stream(String),

    /// The model output is not a well-formed outline literal.
    #[error("Outline parse error: {0}")]
    OutlineParse(#[from] ParseError),

    /// An outline was built from entries that break its invariants.
    #[error("Invalid outline: {0}")]
    InvalidOutline(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing or writing error (for PPTX).
    #[error("XML error: {0}")]
    XmlError(String),

    /// The template has fewer slides than the outline needs.
    #[error("Slide {index} does not exist (template has {count} slides)")]
    SlideOutOfRange { index: usize, count: usize },

    /// A slide lacks the placeholder the writer targets.
    #[error("Slide {slide} has no {placeholder} placeholder")]
    MissingPlaceholder { slide: usize, placeholder: String },
}
