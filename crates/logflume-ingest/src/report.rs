//! JSON-line reporting of structured results and delivery responses.
//!
//! One line per structured result, one line per non-null delivery
//! response, written to the injected output stream (stdout in
//! production). This is observability output on the side of the data
//! path; it never touches the aggregation buffer.

use std::io::Write;

use logflume_core::error::{Error, Result};

use crate::delivery::DeliveryResponse;
use crate::parser::ParseSummary;

/// Emits JSON lines for observability.
pub struct Reporter {
    out: Box<dyn Write + Send>,
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter").finish_non_exhaustive()
    }
}

impl Reporter {
    /// Creates a reporter writing to the given stream.
    #[must_use]
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self { out }
    }

    /// Creates a reporter writing to standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Emits one JSON line for an object's structured result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReportSerialization`] if the summary cannot be
    /// serialized or written; the orchestrator treats this as fatal.
    pub fn report(&mut self, summary: &ParseSummary) -> Result<()> {
        let line = serde_json::to_string(summary)
            .map_err(|e| Error::report_serialization(e.to_string()))?;
        writeln!(self.out, "{line}")
            .map_err(|e| Error::report_serialization(format!("write failed: {e}")))?;
        self.out
            .flush()
            .map_err(|e| Error::report_serialization(format!("flush failed: {e}")))
    }

    /// Emits one JSON line for a non-null delivery response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResponseSerialization`]; the orchestrator logs
    /// this without failing the invocation, since delivery has already
    /// succeeded.
    pub fn report_response(&mut self, response: &DeliveryResponse) -> Result<()> {
        let line = serde_json::to_string(response)
            .map_err(|e| Error::response_serialization(e.to_string()))?;
        writeln!(self.out, "{line}")
            .map_err(|e| Error::response_serialization(format!("write failed: {e}")))?;
        self.out
            .flush()
            .map_err(|e| Error::response_serialization(format!("flush failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Shared in-memory writer for capturing report output.
    #[derive(Debug, Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().expect("lock").clone()).expect("utf8")
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_reports_one_json_line_per_summary() {
        let buf = SharedBuf::default();
        let mut reporter = Reporter::new(Box::new(buf.clone()));

        let mut summary = ParseSummary::new("a.log.gz");
        summary.total = 3;
        summary.matched = 3;
        reporter.report(&summary).expect("report should succeed");

        let output = buf.contents();
        assert_eq!(output.lines().count(), 1);

        let parsed: serde_json::Value =
            serde_json::from_str(output.lines().next().expect("one line")).expect("valid JSON");
        assert_eq!(parsed["source"], "a.log.gz");
        assert_eq!(parsed["matched"], 3);
    }

    #[test]
    fn test_reports_delivery_response_as_json_line() {
        let buf = SharedBuf::default();
        let mut reporter = Reporter::new(Box::new(buf.clone()));

        let response = DeliveryResponse {
            failed_count: 0,
            records: Vec::new(),
        };
        reporter
            .report_response(&response)
            .expect("report should succeed");

        let parsed: serde_json::Value =
            serde_json::from_str(buf.contents().trim()).expect("valid JSON");
        assert_eq!(parsed["failedCount"], 0);
    }

    #[test]
    fn test_write_failure_is_report_serialization_error() {
        struct FailingWriter;

        impl Write for FailingWriter {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut reporter = Reporter::new(Box::new(FailingWriter));
        let err = reporter
            .report(&ParseSummary::new("a.log.gz"))
            .expect_err("should fail");
        assert!(matches!(err, Error::ReportSerialization { .. }));
    }
}
