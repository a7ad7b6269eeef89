//! Invocation trigger types.
//!
//! One invocation is triggered by one batch of object-change
//! notifications. The hosting trigger determines batch size; this module
//! only adapts the notification document into typed references.

use serde::Deserialize;

use crate::error::{Error, Result};

/// Reference to one notified object in storage.
///
/// Immutable; one per notified object, supplied by the trigger.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    /// Storage location (bucket) holding the object.
    pub location: String,
    /// Object key within the location.
    pub key: String,
}

impl ObjectRef {
    /// Creates a new object reference.
    #[must_use]
    pub fn new(location: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            key: key.into(),
        }
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.location, self.key)
    }
}

/// Ordered sequence of object references for one invocation.
///
/// Non-empty when the trigger fires; an empty batch is a degenerate case
/// the pipeline still handles safely (it surfaces as an empty-buffer
/// failure with zero delivery calls).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationBatch {
    objects: Vec<ObjectRef>,
}

impl InvocationBatch {
    /// Creates a batch from an ordered list of object references.
    #[must_use]
    pub fn new(objects: Vec<ObjectRef>) -> Self {
        Self { objects }
    }

    /// Parses a storage-event notification document into a batch.
    ///
    /// The document is the S3-style event shape: `Records[]` entries
    /// each carrying `s3.bucket.name` and `s3.object.key`. Keys are
    /// taken verbatim; no decoding is applied.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the document is not valid
    /// JSON or does not match the notification shape.
    pub fn from_notification(json: &str) -> Result<Self> {
        let notification: StorageNotification = serde_json::from_str(json)
            .map_err(|e| Error::InvalidInput(format!("malformed storage notification: {e}")))?;

        let objects = notification
            .records
            .into_iter()
            .map(|r| ObjectRef::new(r.s3.bucket.name, r.s3.object.key))
            .collect();

        Ok(Self { objects })
    }

    /// Number of objects in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if the batch references no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterates the object references in notification order.
    pub fn iter(&self) -> std::slice::Iter<'_, ObjectRef> {
        self.objects.iter()
    }
}

impl<'a> IntoIterator for &'a InvocationBatch {
    type Item = &'a ObjectRef;
    type IntoIter = std::slice::Iter<'a, ObjectRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}

/// S3-style storage notification document.
#[derive(Debug, Deserialize)]
struct StorageNotification {
    #[serde(rename = "Records", default)]
    records: Vec<NotificationRecord>,
}

#[derive(Debug, Deserialize)]
struct NotificationRecord {
    s3: S3Entity,
}

#[derive(Debug, Deserialize)]
struct S3Entity {
    bucket: BucketEntity,
    object: ObjectEntity,
}

#[derive(Debug, Deserialize)]
struct BucketEntity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ObjectEntity {
    key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTIFICATION: &str = r#"{
        "Records": [
            {
                "eventSource": "aws:s3",
                "eventName": "ObjectCreated:Put",
                "s3": {
                    "bucket": { "name": "alb-logs", "arn": "arn:aws:s3:::alb-logs" },
                    "object": { "key": "AWSLogs/123/elasticloadbalancing/a.log.gz", "size": 1024 }
                }
            },
            {
                "eventSource": "aws:s3",
                "eventName": "ObjectCreated:Put",
                "s3": {
                    "bucket": { "name": "alb-logs" },
                    "object": { "key": "AWSLogs/123/elasticloadbalancing/b.log.gz" }
                }
            }
        ]
    }"#;

    #[test]
    fn test_notification_parses_in_order() {
        let batch = InvocationBatch::from_notification(NOTIFICATION).expect("valid notification");

        assert_eq!(batch.len(), 2);
        let keys: Vec<&str> = batch.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "AWSLogs/123/elasticloadbalancing/a.log.gz",
                "AWSLogs/123/elasticloadbalancing/b.log.gz"
            ]
        );
        assert!(batch.iter().all(|o| o.location == "alb-logs"));
    }

    #[test]
    fn test_notification_without_records_is_empty_batch() {
        let batch = InvocationBatch::from_notification("{}").expect("parses");
        assert!(batch.is_empty());
    }

    #[test]
    fn test_malformed_notification_is_invalid_input() {
        let err = InvocationBatch::from_notification("not json").expect_err("should fail");
        assert!(matches!(err, Error::InvalidInput(_)));

        let err = InvocationBatch::from_notification(r#"{"Records":[{"s3":{}}]}"#)
            .expect_err("should fail");
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_object_ref_display() {
        let object = ObjectRef::new("bucket", "path/to/key.gz");
        assert_eq!(object.to_string(), "bucket/path/to/key.gz");
    }
}
