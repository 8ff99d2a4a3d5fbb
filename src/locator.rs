//! Blob-storage locator parsing
//!
//! Splits an `s3://bucket/key...` locator string into its bucket and key.

use crate::errors::{LexError, Result};
use std::fmt;

const S3_SCHEME: &str = "s3://";

/// Parsed blob-storage locator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Locator {
    pub bucket: String,
    pub key: String,
}

impl S3Locator {
    /// Parse an `s3://bucket/key...` locator
    ///
    /// The key may itself contain path separators; the split happens at the
    /// first `/` after the bucket segment. A missing scheme, empty bucket,
    /// or missing key is a validation error.
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix(S3_SCHEME)
            .ok_or_else(|| LexError::validation("s3_path", "locator must start with s3://"))?;

        let (bucket, key) = rest
            .split_once('/')
            .ok_or_else(|| LexError::validation("s3_path", "locator is missing an object key"))?;

        if bucket.is_empty() {
            return Err(LexError::validation("s3_path", "locator bucket is empty"));
        }

        Ok(Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }
}

impl fmt::Display for S3Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}/{}", S3_SCHEME, self.bucket, self.key)
    }
}
