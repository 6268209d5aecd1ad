// src/errors.rs
//
//! Typed error classes surfaced by this crate.
//!
//! Most operations return `anyhow::Result`; these variants exist so callers
//! who need to distinguish a malformed locator from a data-contract
//! violation can `downcast_ref::<S3UtilError>()` on the error chain.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum S3UtilError {
    /// The locator string does not follow the `s3://bucket/key` scheme.
    #[error("invalid S3 URI: {0}")]
    InvalidUri(String),

    /// An inventory record field did not match the expected format.
    /// This is fatal to the scan that produced it: a corrupt timestamp
    /// means the report schema no longer matches what we parse.
    #[error("malformed {column} value {value:?} in inventory record")]
    Format { column: String, value: String },
}
