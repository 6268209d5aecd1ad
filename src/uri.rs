// src/uri.rs
//! Parsing and formatting of `s3://bucket/key` locators.
//!
//! Pure string handling, no I/O. Every other module resolves a URI into an
//! [`S3Uri`] before touching the transport.

use anyhow::Result;

use crate::config::resolve_public_region;
use crate::constants::S3_SCHEME;
use crate::errors::S3UtilError;

/// Resolved bucket/key/filename triple for one storage object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Uri {
    pub bucket: String,
    pub key: String,
    /// Last path segment of `key` when the locator has more than one
    /// segment, empty otherwise (a bare-bucket or prefix locator).
    pub filename: String,
}

impl S3Uri {
    /// Format back to the canonical `s3://bucket/key` form.
    /// Round-trips through [`parse_s3_uri`] for any locator without
    /// embedded empty segments.
    pub fn to_uri(&self) -> String {
        if self.key.is_empty() {
            format!("{}{}", S3_SCHEME, self.bucket)
        } else {
            format!("{}{}/{}", S3_SCHEME, self.bucket, self.key)
        }
    }
}

impl std::fmt::Display for S3Uri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_uri())
    }
}

/// Split `s3://bucket/key` into an [`S3Uri`].
///
/// Empty path segments are discarded, so `s3://bucket//key` parses the same
/// as `s3://bucket/key`. Fails with [`S3UtilError::InvalidUri`] when the
/// scheme prefix is missing.
pub fn parse_s3_uri(uri: &str) -> Result<S3Uri> {
    let trimmed = uri
        .strip_prefix(S3_SCHEME)
        .ok_or_else(|| S3UtilError::InvalidUri(uri.to_string()))?;

    let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
    let bucket = segments
        .first()
        .ok_or_else(|| S3UtilError::InvalidUri(uri.to_string()))?;

    let filename = if segments.len() > 1 {
        segments[segments.len() - 1].to_string()
    } else {
        String::new()
    };

    Ok(S3Uri {
        bucket: bucket.to_string(),
        key: segments[1..].join("/"),
        filename,
    })
}

/// Convert an `s3://` locator into a virtual-hosted HTTPS URL.
///
/// Region resolution: explicit argument, then `AWS_REGION`, then
/// `AWS_DEFAULT_REGION`, then the crate default. No signature is attached.
pub fn s3_to_https(uri: &str, region: Option<&str>) -> Result<String> {
    let parts = parse_s3_uri(uri)?;
    let region = resolve_public_region(region);
    Ok(format!(
        "https://{}.s3.{}.amazonaws.com/{}",
        parts.bucket, region, parts.key
    ))
}
