//! The pipeline orchestrator.
//!
//! Owns the retrieve → decompress → parse-and-append → report sequence
//! per object, then the single delivery call. Objects are processed
//! strictly in order; the first failure aborts the invocation with no
//! delivery of whatever partial content the buffer already holds.
//!
//! Per invocation: `Start → ProcessingObjects{i} → CheckBuffer →
//! Delivering → Done`, with any failure short-circuiting to `Failed`.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn, Instrument};

use logflume_core::error::{Error, Result};
use logflume_core::event::{InvocationBatch, ObjectRef};
use logflume_core::observability::ingest_span;
use logflume_core::storage::StorageBackend;

use crate::decompress::GzipStream;
use crate::delivery::{DeliveryResponse, DeliverySink};
use crate::parser::LogParser;
use crate::report::Reporter;

/// Outcome of a successful invocation.
#[derive(Debug)]
pub struct IngestOutcome {
    /// Number of objects processed.
    pub objects: usize,
    /// Size of the delivered record in bytes.
    pub delivered_bytes: usize,
    /// Delivery response, when the sink returned one.
    pub response: Option<DeliveryResponse>,
}

/// Orchestrates one invocation of the ingestion pipeline.
///
/// All per-invocation state (the aggregation buffer, the outcome) is
/// created inside [`run`](Self::run) and dropped at its end; the
/// pipeline holds nothing across invocations. The shared buffer needs
/// no synchronization because objects are processed sequentially.
pub struct IngestPipeline {
    storage: Arc<dyn StorageBackend>,
    parser: Arc<dyn LogParser>,
    sink: Arc<dyn DeliverySink>,
    reporter: Reporter,
}

impl IngestPipeline {
    /// Assembles a pipeline from its collaborators.
    #[must_use]
    pub fn new(
        storage: Arc<dyn StorageBackend>,
        parser: Arc<dyn LogParser>,
        sink: Arc<dyn DeliverySink>,
        reporter: Reporter,
    ) -> Self {
        Self {
            storage,
            parser,
            sink,
            reporter,
        }
    }

    /// Runs one invocation over `batch`.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered: retrieval, decompression,
    /// parse, or report failure for any object; [`Error::EmptyBuffer`]
    /// when processing left nothing to deliver; or the delivery
    /// failure. A response-serialization failure after successful
    /// delivery is logged, not returned.
    pub async fn run(&mut self, batch: &InvocationBatch) -> Result<IngestOutcome> {
        let mut buffer: Vec<u8> = Vec::new();

        for object in batch {
            let span = ingest_span("process_object", &object.location, &object.key);
            self.process_object(object, &mut buffer)
                .instrument(span)
                .await?;
        }

        if buffer.is_empty() {
            return Err(Error::EmptyBuffer);
        }

        let record = Bytes::from(buffer);
        let delivered_bytes = record.len();
        info!(
            objects = batch.len(),
            bytes = delivered_bytes,
            "delivering aggregated record"
        );

        let response = self.sink.put_batch(record).await?;

        if let Some(response) = &response {
            if let Err(err) = self.reporter.report_response(response) {
                if err.is_fatal() {
                    return Err(err);
                }
                // Delivery already succeeded; an unserializable response
                // must not fail the invocation.
                warn!(error = %err, "delivery response not serialized");
            }
        }

        Ok(IngestOutcome {
            objects: batch.len(),
            delivered_bytes,
            response,
        })
    }

    async fn process_object(&mut self, object: &ObjectRef, buffer: &mut Vec<u8>) -> Result<()> {
        let raw = self.storage.fetch(&object.location, &object.key).await?;

        // The stream is scoped to this object; it is released on every
        // exit path below.
        let mut stream = GzipStream::open(&object.key, raw)?;
        let summary = self.parser.parse(&mut stream, buffer, &object.key)?;

        self.reporter.report(&summary)?;
        Ok(())
    }
}
