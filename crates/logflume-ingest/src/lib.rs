//! # logflume-ingest
//!
//! Invocation-triggered batch log-ingestion pipeline.
//!
//! On notification of newly written compressed log objects, the
//! pipeline retrieves each object, decompresses it, parses it into
//! structured records with a log-grammar engine, accumulates all
//! objects' serialized output in a single per-invocation buffer, and
//! delivers that buffer as exactly one record to a streaming sink.
//!
//! Control flow is strictly sequential per invocation; the first
//! failure aborts the whole invocation with no partial delivery.
//!
//! ## Components
//!
//! - [`decompress`]: gzip stream decoding, scoped to one object
//! - [`parser`]: the log-grammar seam and the bundled ALB grammar
//! - [`report`]: JSON-line reporting of structured results
//! - [`delivery`]: the streaming-sink seam with Firehose and in-memory
//!   implementations
//! - [`pipeline`]: the orchestrator owning the sequence above

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod decompress;
pub mod delivery;
pub mod parser;
pub mod pipeline;
pub mod report;

pub use decompress::GzipStream;
pub use delivery::{DeliveryResponse, DeliverySink, MemorySink};
pub use parser::{AlbParser, LogParser, ParseSummary};
pub use pipeline::{IngestOutcome, IngestPipeline};
pub use report::Reporter;
