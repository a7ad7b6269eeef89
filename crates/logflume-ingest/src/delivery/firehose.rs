//! Kinesis Data Firehose delivery backend.
//!
//! Issues one `PutRecordBatch` call carrying exactly one record: the
//! invocation's full aggregation buffer. The delivery stream name is an
//! environment variable read at call time, never cached, so a stream
//! rename takes effect on the next invocation without a restart.

use async_trait::async_trait;
use aws_sdk_firehose::primitives::Blob;
use aws_sdk_firehose::types::Record;
use bytes::Bytes;

use logflume_core::error::{Error, Result};

use super::{DeliveryResponse, DeliverySink, RecordStatus};

/// Environment variable naming the delivery stream.
pub const DELIVERY_STREAM_ENV: &str = "LOGFLUME_DELIVERY_STREAM";

/// Optional endpoint override for Firehose-compatible local stacks.
pub const ENDPOINT_URL_ENV: &str = "LOGFLUME_FIREHOSE_ENDPOINT_URL";

/// Firehose-backed delivery sink.
#[derive(Debug, Clone)]
pub struct FirehoseSink {
    client: aws_sdk_firehose::Client,
}

impl FirehoseSink {
    /// Builds a sink from the ambient AWS environment.
    ///
    /// Region and credentials follow standard AWS resolution. Set
    /// [`ENDPOINT_URL_ENV`] to target a local Firehose-compatible
    /// endpoint.
    pub async fn from_env() -> Result<Self> {
        let cfg = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

        let mut builder = aws_sdk_firehose::config::Builder::from(&cfg);
        if let Ok(url) = std::env::var(ENDPOINT_URL_ENV) {
            builder = builder.endpoint_url(url);
        }

        Ok(Self {
            client: aws_sdk_firehose::Client::from_conf(builder.build()),
        })
    }

    /// Wraps an existing Firehose client.
    #[must_use]
    pub fn with_client(client: aws_sdk_firehose::Client) -> Self {
        Self { client }
    }

    fn stream_name() -> Result<String> {
        std::env::var(DELIVERY_STREAM_ENV)
            .map_err(|_| Error::config(format!("{DELIVERY_STREAM_ENV} is not set")))
    }
}

#[async_trait]
impl DeliverySink for FirehoseSink {
    async fn put_batch(&self, record: Bytes) -> Result<Option<DeliveryResponse>> {
        // Read at call time, per the delivery contract.
        let stream_name = Self::stream_name()?;

        let record = Record::builder()
            .data(Blob::new(record.to_vec()))
            .build()
            .map_err(|e| Error::delivery(format!("cannot build delivery record: {e}")))?;

        let output = self
            .client
            .put_record_batch()
            .delivery_stream_name(&stream_name)
            .records(record)
            .send()
            .await
            .map_err(|e| {
                Error::delivery_with_source(format!("put_record_batch to {stream_name} failed"), e)
            })?;

        let response = DeliveryResponse {
            failed_count: u32::try_from(output.failed_put_count()).unwrap_or(0),
            records: output
                .request_responses()
                .iter()
                .map(|entry| RecordStatus {
                    record_id: entry.record_id().map(str::to_string),
                    error_code: entry.error_code().map(str::to_string),
                    error_message: entry.error_message().map(str::to_string),
                })
                .collect(),
        };

        Ok(Some(response))
    }
}
