//! Error types for the gendoc library.

use std::io;
use thiserror::Error;

/// Result type alias for gendoc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during file generation.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during package assembly.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error writing or reading a ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// Invalid or malformed input data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A required package part is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// The payload was not valid base64.
    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(String),

    /// A text file was requested with an extension outside the allowed set.
    #[error("Unsupported format .{extension}: text files may only use md, txt, html, json, xml or csv. Use the dedicated operation for .{extension} files instead")]
    UnsupportedTextExtension {
        /// The disallowed extension, without the leading dot.
        extension: String,
    },

    /// No slide layout in the template matched the requested name.
    #[error("Slide layout not found: {0}")]
    LayoutNotFound(String),

    /// The template layout is missing a placeholder the mapping expects.
    #[error("Placeholder with index {index} not found on layout '{layout}'")]
    MissingPlaceholder {
        /// Display name of the layout the slide was cloned from.
        layout: String,
        /// The placeholder index the static mapping demanded.
        index: u32,
    },

    /// Persistence-layer failure, passed through from the store unmodified.
    #[error("Store error: {0}")]
    Store(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::InvalidBase64(err.to_string())
    }
}
