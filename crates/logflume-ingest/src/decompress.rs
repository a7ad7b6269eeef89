//! Gzip stream decompression, scoped to one object.
//!
//! Objects are unbounded at design time, so decoded bytes are exposed
//! incrementally; the decompressed contents are never materialized as a
//! whole. The stream is owned by the processing of its one object and
//! released when that scope ends, on success and failure alike.

use std::io::{BufRead, BufReader, Cursor, Read};

use bytes::Bytes;
use flate2::bufread::MultiGzDecoder;

use logflume_core::error::{Error, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Incremental gzip decoder over one fetched object.
///
/// Since the underlying cursor over fetched bytes is infallible, any
/// I/O error surfaced while reading through this stream is by
/// construction a decode failure.
#[derive(Debug)]
pub struct GzipStream {
    inner: BufReader<MultiGzDecoder<Cursor<Bytes>>>,
}

impl GzipStream {
    /// Opens a decompression stream over an object's raw bytes.
    ///
    /// The gzip magic is validated eagerly, so an object that is not a
    /// gzip stream fails at open rather than on first read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decompression`] if the input does not start
    /// with a gzip header.
    pub fn open(key: &str, raw: Bytes) -> Result<Self> {
        if raw.len() < GZIP_MAGIC.len() || raw[..GZIP_MAGIC.len()] != GZIP_MAGIC {
            return Err(Error::decompression(key, "not a gzip stream (bad magic)"));
        }

        Ok(Self {
            inner: BufReader::new(MultiGzDecoder::new(Cursor::new(raw))),
        })
    }
}

impl Read for GzipStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl BufRead for GzipStream {
    fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt);
    }
}
