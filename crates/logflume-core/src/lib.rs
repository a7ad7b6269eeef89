//! # logflume-core
//!
//! Shared primitives for the logflume batch log-ingestion pipeline.
//!
//! This crate provides the foundational types used across logflume
//! components:
//!
//! - **Error Types**: The pipeline error taxonomy and result alias
//! - **Invocation Types**: Object references and the per-invocation batch
//! - **Storage Traits**: The object-read abstraction with production and
//!   in-memory backends
//! - **Observability**: Logging initialization and span constructors
//!
//! ## Example
//!
//! ```rust
//! use logflume_core::prelude::*;
//!
//! let object = ObjectRef::new("my-bucket", "logs/2024/app.log.gz");
//! let batch = InvocationBatch::new(vec![object]);
//! assert_eq!(batch.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod event;
pub mod observability;
pub mod storage;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use logflume_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::event::{InvocationBatch, ObjectRef};
    pub use crate::storage::{MemoryBackend, ObjectStoreBackend, StorageBackend};
}

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use event::{InvocationBatch, ObjectRef};
pub use observability::{init_logging, ingest_span, LogFormat};
pub use storage::{MemoryBackend, ObjectStoreBackend, StorageBackend};
