//! The log-grammar engine seam.
//!
//! A parser is driven once per object. It consumes the decoded byte
//! stream and writes its serialized structured output directly and
//! incrementally into the caller-supplied sink (the invocation's shared
//! aggregation buffer), never into a per-object buffer that is copied
//! later. Per-line mismatches do not abort the object: they are
//! embedded in the returned summary.

mod alb;

pub use alb::AlbParser;

use std::io::{BufRead, Write};

use serde::Serialize;

use logflume_core::error::Result;

/// Structured summary of one object's parse.
///
/// This is the per-object structured result the reporter serializes to
/// one observability line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseSummary {
    /// Object key the summary describes.
    pub source: String,
    /// Non-empty lines consumed from the decoded stream.
    pub total: u64,
    /// Lines recognized by the grammar and serialized into the buffer.
    pub matched: u64,
    /// Lines the grammar did not recognize.
    pub unmatched: u64,
    /// The unrecognized lines, embedded rather than aborting the object.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<LineError>,
}

impl ParseSummary {
    /// Creates an empty summary for the given source key.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }
}

/// One line the grammar did not recognize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineError {
    /// 1-indexed position of the line within the object.
    pub line_number: u64,
    /// The raw line as read from the decoded stream.
    pub record: String,
}

/// A log-grammar engine.
///
/// Implementations must be deterministic: parsing the same stream twice
/// must append byte-identical output to `out`.
pub trait LogParser: Send + Sync {
    /// Parses the decoded stream for one object.
    ///
    /// Appends one serialized record per recognized line directly to
    /// `out` and returns the object's summary.
    ///
    /// # Errors
    ///
    /// Returns [`logflume_core::Error::Decompression`] if reading the
    /// decoded stream fails (the stream's only fallible layer is the
    /// decoder) and [`logflume_core::Error::Parse`] if serializing a
    /// recognized record fails.
    fn parse(
        &self,
        input: &mut dyn BufRead,
        out: &mut dyn Write,
        source: &str,
    ) -> Result<ParseSummary>;
}
