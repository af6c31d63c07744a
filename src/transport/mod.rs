//! Batch delivery
//!
//! A flushed batch is joined, gzip-compressed at the best compression level
//! and handed to a [`Transport`]. The HTTP collector transport is the
//! default; the trait is the seam for alternative delivery.

pub mod http;

pub use http::HttpTransport;

use crate::core::{Result, ShipperError};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;

// Header names are case-insensitive; lowercase is what goes on the wire
/// `X-Sumo-Name`, carrying the source name
pub const SOURCE_NAME_HEADER: &str = "x-sumo-name";
/// `X-Sumo-Host`, carrying the source host
pub const SOURCE_HOST_HEADER: &str = "x-sumo-host";
/// `X-Sumo-Category`, carrying the source category
pub const SOURCE_CATEGORY_HEADER: &str = "x-sumo-category";

/// Routing tags sent with every batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTags {
    pub name: String,
    pub host: String,
    pub category: String,
}

impl SourceTags {
    pub fn new(
        name: impl Into<String>,
        host: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            category: category.into(),
        }
    }
}

/// Compressed batch body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GzipPayload {
    body: Vec<u8>,
    records: usize,
    uncompressed_len: usize,
}

impl GzipPayload {
    /// Compress a newline-joined batch
    pub fn compress(joined: &str, records: usize) -> Result<Self> {
        let body = gzip_into(joined.as_bytes(), Vec::with_capacity(joined.len() / 4 + 64))?;
        Ok(Self {
            body,
            records,
            uncompressed_len: joined.len(),
        })
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    pub fn records(&self) -> usize {
        self.records
    }

    pub fn uncompressed_len(&self) -> usize {
        self.uncompressed_len
    }
}

/// Gzip `payload` at the best compression level into `sink`
pub fn gzip_into<W: Write>(payload: &[u8], sink: W) -> Result<W> {
    let mut encoder = GzEncoder::new(sink, Compression::best());
    encoder
        .write_all(payload)
        .map_err(|e| ShipperError::compression("writing gzip stream", e))?;
    encoder
        .finish()
        .map_err(|e| ShipperError::compression("finishing gzip stream", e))
}

/// Delivers one compressed batch
///
/// Implementations must be safe to call from several workers at once.
/// Any error means the batch is lost; callers never retry.
pub trait Transport: Send + Sync {
    fn deliver(&self, payload: GzipPayload) -> Result<()>;
    fn name(&self) -> &str;
}
