//! Storage read abstraction for the ingestion pipeline.
//!
//! The pipeline only ever reads whole objects by explicit reference; it
//! never lists. The contract is deliberately narrow so backends stay
//! interchangeable and the pipeline stays testable without live
//! external services.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path;
use object_store::ObjectStore;

use crate::error::{Error, Result};

/// Storage read contract for the pipeline.
///
/// One failed fetch aborts the object and, per the orchestrator's
/// fail-fast policy, the whole invocation. No retry logic lives here;
/// any retry policy belongs to the backend's client.
#[async_trait]
pub trait StorageBackend: Send + Sync + 'static {
    /// Fetches the full contents of one object.
    ///
    /// Returns [`Error::Retrieval`] on any failure (object missing,
    /// access denied, transient storage fault).
    async fn fetch(&self, location: &str, key: &str) -> Result<Bytes>;
}

/// Production backend over the `object_store` crate.
///
/// Builds one S3 client per storage location on first use and caches
/// it, so an invocation touching several buckets constructs each client
/// once. Credentials, region, and endpoint come from the ambient
/// environment.
#[derive(Debug, Default)]
pub struct ObjectStoreBackend {
    stores: RwLock<HashMap<String, Arc<dyn ObjectStore>>>,
}

impl ObjectStoreBackend {
    /// Creates a new backend with an empty client cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn store_for(&self, location: &str) -> Result<Arc<dyn ObjectStore>> {
        {
            let stores = self.stores.read().map_err(|_| Error::Internal {
                message: "store cache lock poisoned".into(),
            })?;
            if let Some(store) = stores.get(location) {
                return Ok(Arc::clone(store));
            }
        }

        let store = AmazonS3Builder::from_env()
            .with_bucket_name(location)
            .build()
            .map_err(|e| {
                Error::retrieval_with_source(location, "", "cannot build storage client", e)
            })?;
        let store: Arc<dyn ObjectStore> = Arc::new(store);

        let mut stores = self.stores.write().map_err(|_| Error::Internal {
            message: "store cache lock poisoned".into(),
        })?;
        Ok(Arc::clone(
            stores
                .entry(location.to_string())
                .or_insert_with(|| store),
        ))
    }
}

#[async_trait]
impl StorageBackend for ObjectStoreBackend {
    async fn fetch(&self, location: &str, key: &str) -> Result<Bytes> {
        let store = self.store_for(location)?;
        let path = Path::from(key);

        let result = store.get(&path).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => {
                Error::retrieval(location, key, "object not found")
            }
            other => Error::retrieval_with_source(location, key, "storage get failed", other),
        })?;

        result
            .bytes()
            .await
            .map_err(|e| Error::retrieval_with_source(location, key, "storage read failed", e))
    }
}

/// In-memory storage backend for testing.
///
/// Thread-safe; records every fetch (location and key, in call order)
/// so tests can assert which objects were retrieved, and supports
/// per-key failure injection. Not suitable for production.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    objects: Arc<Mutex<HashMap<(String, String), Bytes>>>,
    fetches: Arc<Mutex<Vec<(String, String)>>>,
    fail_keys: Arc<Mutex<Vec<String>>>,
}

impl MemoryBackend {
    /// Creates a new empty memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an object's contents.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn put(&self, location: impl Into<String>, key: impl Into<String>, data: impl Into<Bytes>) {
        self.objects
            .lock()
            .expect("lock")
            .insert((location.into(), key.into()), data.into());
    }

    /// Returns every fetch issued against this backend, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn fetches(&self) -> Vec<(String, String)> {
        self.fetches.lock().expect("lock").clone()
    }

    /// Injects a retrieval failure for the given key.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn inject_failure(&self, key: impl Into<String>) {
        self.fail_keys.lock().expect("lock").push(key.into());
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn fetch(&self, location: &str, key: &str) -> Result<Bytes> {
        self.fetches
            .lock()
            .map_err(|_| Error::internal("fetch log lock poisoned"))?
            .push((location.to_string(), key.to_string()));

        let injected = self
            .fail_keys
            .lock()
            .map_err(|_| Error::internal("failure list lock poisoned"))?
            .iter()
            .any(|k| k == key);
        if injected {
            return Err(Error::retrieval(location, key, "injected failure"));
        }

        self.objects
            .lock()
            .map_err(|_| Error::internal("object map lock poisoned"))?
            .get(&(location.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| Error::retrieval(location, key, "object not found"))
    }
}
