//! In-memory delivery sink for testing.
//!
//! Records every call's bytes for assertions and supports a scripted
//! response and failure injection. Not suitable for production.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;

use logflume_core::error::{Error, Result};

use super::{DeliveryResponse, DeliverySink};

/// Converts a lock poison error to an internal error.
fn poison_err<T>(_: PoisonError<T>) -> Error {
    Error::internal("delivery sink lock poisoned")
}

/// In-memory delivery sink.
///
/// Thread-safe and cloneable; clones share state so tests can keep a
/// handle for assertions after handing the sink to the pipeline.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    calls: Arc<Mutex<Vec<Bytes>>>,
    response: Arc<Mutex<Option<DeliveryResponse>>>,
    fail: Arc<Mutex<bool>>,
}

impl MemorySink {
    /// Creates a sink that accepts every record and returns no response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that returns the given response on every call.
    #[must_use]
    pub fn with_response(response: DeliveryResponse) -> Self {
        let sink = Self::default();
        *sink.response.lock().expect("lock") = Some(response);
        sink
    }

    /// Makes every subsequent call fail with a delivery error.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn inject_failure(&self) {
        *self.fail.lock().expect("lock") = true;
    }

    /// Returns every delivered (or attempted) record, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<Bytes> {
        self.calls.lock().expect("lock").clone()
    }
}

#[async_trait]
impl DeliverySink for MemorySink {
    async fn put_batch(&self, record: Bytes) -> Result<Option<DeliveryResponse>> {
        self.calls.lock().map_err(poison_err)?.push(record);

        if *self.fail.lock().map_err(poison_err)? {
            return Err(Error::delivery("injected delivery failure"));
        }

        Ok(self.response.lock().map_err(poison_err)?.clone())
    }
}
