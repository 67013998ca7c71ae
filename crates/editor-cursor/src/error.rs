//! Error types.

use crate::session::MarkerId;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced by sessions, markers and cursor configuration.
pub enum CursorError {
    #[error("unknown marker {0:?}")]
    /// The marker id does not belong to the session (or was already destroyed).
    UnknownMarker(MarkerId),

    #[error("invalid configuration: {0}")]
    /// A configuration value is out of range.
    InvalidConfig(&'static str),

    #[error("configuration parse error: {0}")]
    /// Configuration JSON could not be parsed.
    ConfigParse(#[from] serde_json::Error),

    #[error("regex compile error: {0}")]
    /// A caller-supplied word pattern failed to compile.
    InvalidRegex(#[from] regex::Error),
}
