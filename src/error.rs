//! Error types for installer analysis.
//!
//! Detection itself is best-effort and degrades to "unknown" rather than
//! failing, so these errors mostly travel between internal layers and are
//! logged before being discarded at the public detection boundary.

use thiserror::Error;

/// Main error type for installer analysis operations.
#[derive(Debug, Error)]
pub enum InsightError {
    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Zip container could not be read
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Embedded XML manifest could not be parsed
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed attribute inside an embedded XML manifest
    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    /// MSI compound-file database could not be read
    #[error("MSI error: {0}")]
    Msi(String),

    /// A required entry is missing from a container
    #[error("Missing entry `{0}` in container")]
    MissingEntry(String),

    /// Resource limit exceeded
    #[error("Resource limit exceeded: {resource} ({used}/{limit})")]
    ResourceExhausted {
        resource: String,
        used: u64,
        limit: u64,
    },

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type alias for installer analysis operations
pub type Result<T> = std::result::Result<T, InsightError>;
