//! Error types and result aliases for logflume.
//!
//! Every failure the pipeline can surface is enumerated here. All kinds
//! abort the invocation except `ResponseSerialization`, which the
//! orchestrator logs and swallows because the delivery call has already
//! succeeded by the time it can occur.

/// The result type used throughout logflume.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while ingesting a batch of log objects.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Fetching an object from storage failed.
    #[error("retrieval failed for {location}/{key}: {message}")]
    Retrieval {
        /// Storage location (bucket) of the object.
        location: String,
        /// Key of the object within the location.
        key: String,
        /// Description of the retrieval failure.
        message: String,
        /// The underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Opening or reading a decompression stream failed.
    #[error("decompression failed for {key}: {message}")]
    Decompression {
        /// Key of the object whose stream failed to decode.
        key: String,
        /// Description of the decode failure.
        message: String,
    },

    /// The log-grammar engine failed for an object.
    ///
    /// Per-line mismatches are not parse failures; they are embedded in
    /// the object's structured result instead.
    #[error("parse failed for {key}: {message}")]
    Parse {
        /// Key of the object that failed to parse.
        key: String,
        /// Description of the parse failure.
        message: String,
    },

    /// A structured result could not be serialized for reporting.
    ///
    /// Treated with the same severity as a parse failure, since it
    /// signals a malformed result shape.
    #[error("report serialization failed: {message}")]
    ReportSerialization {
        /// Description of the serialization failure.
        message: String,
    },

    /// The aggregation buffer had no content to deliver.
    ///
    /// A business-rule violation, not a transient fault: either the
    /// batch was empty or no object produced any output.
    #[error("nothing to deliver: aggregation buffer is empty")]
    EmptyBuffer,

    /// The delivery call failed.
    #[error("delivery failed: {message}")]
    Delivery {
        /// Description of the delivery failure.
        message: String,
        /// The underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The delivery response could not be serialized.
    ///
    /// The only non-fatal kind: delivery already succeeded, so the
    /// orchestrator logs this instead of failing the invocation.
    #[error("delivery response serialization failed: {message}")]
    ResponseSerialization {
        /// Description of the serialization failure.
        message: String,
    },

    /// Missing or invalid runtime configuration.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration problem.
        message: String,
    },

    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An internal error occurred that should not happen in normal operation.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl Error {
    /// Creates a new retrieval error for the given object.
    #[must_use]
    pub fn retrieval(
        location: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Retrieval {
            location: location.into(),
            key: key.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new retrieval error with a source cause.
    #[must_use]
    pub fn retrieval_with_source(
        location: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Retrieval {
            location: location.into(),
            key: key.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new decompression error for the given object key.
    #[must_use]
    pub fn decompression(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decompression {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Creates a new parse error for the given object key.
    #[must_use]
    pub fn parse(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Creates a new report serialization error.
    #[must_use]
    pub fn report_serialization(message: impl Into<String>) -> Self {
        Self::ReportSerialization {
            message: message.into(),
        }
    }

    /// Creates a new delivery error.
    #[must_use]
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new delivery error with a source cause.
    #[must_use]
    pub fn delivery_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Delivery {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new response serialization error.
    #[must_use]
    pub fn response_serialization(message: impl Into<String>) -> Self {
        Self::ResponseSerialization {
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this error aborts the invocation.
    ///
    /// Only `ResponseSerialization` is non-fatal.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::ResponseSerialization { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(Error::EmptyBuffer.is_fatal());
        assert!(Error::retrieval("b", "k", "gone").is_fatal());
        assert!(Error::delivery("refused").is_fatal());
        assert!(!Error::response_serialization("bad shape").is_fatal());
    }

    #[test]
    fn test_display_includes_object_key() {
        let err = Error::decompression("logs/a.gz", "bad magic");
        assert!(err.to_string().contains("logs/a.gz"));
        assert!(err.to_string().contains("bad magic"));
    }
}
