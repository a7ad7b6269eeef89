//! Batch delivery sink abstraction.
//!
//! This module provides:
//!
//! - [`DeliverySink`]: Trait for delivering one aggregated record to a
//!   streaming sink
//! - [`DeliveryResponse`]: Owned response shape, independent of any
//!   backend SDK
//! - [`MemorySink`]: In-memory sink for testing
//! - `FirehoseSink` (feature `firehose`): Kinesis Data Firehose backend
//!
//! ## Design Principles
//!
//! - **One record per invocation**: the full aggregation buffer goes out
//!   as exactly one record in one call; no chunking, no splitting by
//!   object or size
//! - **Backend agnostic**: the orchestrator never sees SDK types

#[cfg(feature = "firehose")]
mod firehose;
mod memory;

#[cfg(feature = "firehose")]
pub use firehose::{FirehoseSink, DELIVERY_STREAM_ENV, ENDPOINT_URL_ENV};
pub use memory::MemorySink;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use logflume_core::error::Result;

/// Response returned by a delivery backend, when it returns one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResponse {
    /// Number of records the sink failed to persist.
    pub failed_count: u32,
    /// Per-record outcome, in record order.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub records: Vec<RecordStatus>,
}

/// Outcome of one record within a delivery call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordStatus {
    /// Backend-assigned record identifier, when persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    /// Error code, when the record was not persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Error detail, when the record was not persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Streaming-delivery sink.
///
/// The orchestrator guarantees `record` is non-empty and calls this at
/// most once per invocation.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Delivers the aggregated buffer as exactly one record.
    ///
    /// Returns the backend's response when it produced one.
    ///
    /// # Errors
    ///
    /// Returns [`logflume_core::Error::Delivery`] if the call fails and
    /// [`logflume_core::Error::Config`] if required delivery
    /// configuration is missing at call time.
    async fn put_batch(&self, record: Bytes) -> Result<Option<DeliveryResponse>>;
}
