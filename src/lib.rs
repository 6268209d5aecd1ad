// src/lib.rs
//
// Copyright, 2025.  Signal65 / Futurum Group.
//
// Crate root — module declarations plus public re-exports.
//
//! Helper library for objects addressed by `s3://bucket/key` locators:
//! URI resolution, listing, read/upload/download, inventory-report
//! scanning, and offline SigV4 request signing.

pub mod client;
pub mod config;
pub mod constants;
pub mod errors;
pub mod inventory;
pub mod list;
pub mod ops;
pub mod presign;
pub mod uri;

pub use client::{AwsClient, ListPage, ObjectClient, PutOptions};
pub use config::{
    SigningCredentials, env_fallback, resolve_credentials, resolve_public_region,
    resolve_signing_region,
};
pub use constants::{DEFAULT_REGION, MANIFEST_SUFFIX};
pub use errors::S3UtilError;
pub use inventory::{InventoryQuery, InventoryRecord, Manifest, latest_inventory, latest_manifest_key};
pub use list::find_objects;
pub use ops::{download, exists, read, read_json, upload};
pub use presign::{PresignOptions, SignedRequest, presign_url, sign_request};
pub use uri::{S3Uri, parse_s3_uri, s3_to_https};
