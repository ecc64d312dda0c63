//! Structural extraction errors.
//!
//! Field-level misses are not errors: an exhausted strategy list resolves to
//! the configured default and shows up as `strategy_used: None` in the
//! outcome. Only broken assumptions about document structure surface here,
//! so strategy lists can be maintained against the sites that changed.

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExtractError {
    /// A marker and an opening brace were found, but the brace-balanced scan
    /// ran off the end of the text before depth returned to zero.
    #[error("embedded object after marker {marker:?} never closes")]
    MalformedEmbeddedObject { marker: String },

    /// A balanced substring was extracted but failed strict JSON parsing,
    /// typically because it was a raw JavaScript object literal (unquoted
    /// keys, single quotes, trailing commas). Callers may retry with
    /// [`parse_loose`](crate::extractors::parse_loose).
    #[error("embedded object after marker {marker:?} is not valid JSON: {reason}")]
    UnparsableExtractedObject { marker: String, reason: String },
}
